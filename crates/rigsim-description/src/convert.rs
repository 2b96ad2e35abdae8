//! URDF to SDF conversion.
//!
//! ## Mapping
//!
//! | URDF | SDF |
//! |------|-----|
//! | `<robot name>` | `<model name>` |
//! | `<link>` | `<link>` with a model-frame `<pose>` |
//! | `<joint origin>` | composed into the child link pose |
//! | `revolute`, `prismatic`, `fixed` | same type |
//! | `continuous` | `revolute` without position limits |
//! | a root link named `world` | joint parent `world` (anchors the model) |
//!
//! URDF places every joint frame at its child link origin, so each SDF
//! joint keeps the identity pose relative to its child and the axis
//! carries over unchanged. Link poses are composed root to leaf. Visual
//! and collision geometry is not carried over.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use quick_xml::escape::escape;
use rigsim_core::Pose;
use tracing::debug;

use crate::error::DescriptionError;
use crate::urdf::{parse_urdf, UrdfInertial, UrdfJoint, UrdfJointKind, UrdfRobot};

/// URDF link name that stands for the world frame.
const WORLD_LINK: &str = "world";

/// Converts URDF text to SDF 1.6 text.
///
/// Returns the complete document or an error. Partial output is never
/// produced.
pub fn convert_legacy_description(urdf: &str) -> Result<String, DescriptionError> {
    let robot = parse_urdf(urdf)?;
    let sdf = robot_to_sdf(&robot)?;
    debug!(
        robot = %robot.name,
        links = robot.links.len(),
        joints = robot.joints.len(),
        "converted URDF to SDF"
    );
    Ok(sdf)
}

/// Converts a parsed robot to SDF 1.6 text.
pub fn robot_to_sdf(robot: &UrdfRobot) -> Result<String, DescriptionError> {
    Converter::new(robot)?.convert()
}

struct Converter<'a> {
    robot: &'a UrdfRobot,
    /// Joints grouped by parent link, in declaration order.
    parent_to_joints: HashMap<&'a str, Vec<&'a UrdfJoint>>,
    root: &'a str,
    output: String,
    indent: usize,
}

impl<'a> Converter<'a> {
    fn new(robot: &'a UrdfRobot) -> Result<Self, DescriptionError> {
        let mut names = HashSet::new();
        for link in &robot.links {
            if !names.insert(link.name.as_str()) {
                return Err(DescriptionError::invalid_value("duplicate link", &link.name));
            }
        }

        let mut children = HashSet::new();
        let mut parent_to_joints: HashMap<&str, Vec<&UrdfJoint>> = HashMap::new();
        for joint in &robot.joints {
            for link in [&joint.parent, &joint.child] {
                if !names.contains(link.as_str()) {
                    return Err(DescriptionError::UndefinedLink {
                        joint: joint.name.clone(),
                        link: link.clone(),
                    });
                }
            }
            if !children.insert(joint.child.as_str()) {
                return Err(DescriptionError::Unsupported {
                    feature: format!("link '{}' has more than one parent joint", joint.child),
                });
            }
            if matches!(joint.kind, UrdfJointKind::Floating | UrdfJointKind::Planar) {
                return Err(DescriptionError::Unsupported {
                    feature: format!("joint '{}' of type {:?}", joint.name, joint.kind),
                });
            }
            parent_to_joints
                .entry(joint.parent.as_str())
                .or_default()
                .push(joint);
        }

        let mut roots = robot
            .links
            .iter()
            .map(|l| l.name.as_str())
            .filter(|name| !children.contains(name));
        let root = roots.next().ok_or(DescriptionError::NoRootLink)?;
        if let Some(other) = roots.next() {
            return Err(DescriptionError::Unsupported {
                feature: format!("multiple root links ('{root}' and '{other}')"),
            });
        }

        Ok(Self {
            robot,
            parent_to_joints,
            root,
            output: String::with_capacity(4096),
            indent: 0,
        })
    }

    fn convert(mut self) -> Result<String, DescriptionError> {
        self.write_line(r#"<?xml version="1.0"?>"#);
        self.write_line(r#"<sdf version="1.6">"#);
        self.indent += 1;
        self.write_line(&format!(r#"<model name="{}">"#, escape(&self.robot.name)));
        self.indent += 1;

        // Depth-first from the root; parents are emitted before children.
        let mut joints = Vec::with_capacity(self.robot.joints.len());
        let mut stack = vec![(self.root, Pose::identity())];
        let mut visited = 0usize;
        while let Some((name, pose)) = stack.pop() {
            visited += 1;
            let anchored_world = name == WORLD_LINK && name == self.root;
            if !anchored_world {
                self.write_link(name, &pose);
            }
            let children: Vec<&'a UrdfJoint> =
                self.parent_to_joints.get(name).cloned().unwrap_or_default();
            for joint in children.iter().rev() {
                stack.push((joint.child.as_str(), pose.compose(&joint.origin)));
            }
            joints.extend(children);
        }
        if visited != self.robot.links.len() {
            return Err(DescriptionError::Unsupported {
                feature: "links not connected to the root link".to_string(),
            });
        }

        for joint in joints {
            self.write_joint(joint);
        }

        self.indent -= 1;
        self.write_line("</model>");
        self.indent -= 1;
        self.write_line("</sdf>");
        Ok(self.output)
    }

    fn write_link(&mut self, name: &str, pose: &Pose) {
        let inertial = self
            .robot
            .links
            .iter()
            .find(|l| l.name == name)
            .and_then(|l| l.inertial.clone());

        self.write_line(&format!(r#"<link name="{}">"#, escape(name)));
        self.indent += 1;
        self.write_line(&format!("<pose>{}</pose>", format_pose(pose)));
        if let Some(inertial) = inertial {
            self.write_inertial(&inertial);
        }
        self.indent -= 1;
        self.write_line("</link>");
    }

    fn write_inertial(&mut self, inertial: &UrdfInertial) {
        let i = &inertial.inertia;
        self.write_line("<inertial>");
        self.indent += 1;
        self.write_line(&format!("<pose>{}</pose>", format_pose(&inertial.origin)));
        self.write_line(&format!("<mass>{}</mass>", inertial.mass));
        self.write_line("<inertia>");
        self.indent += 1;
        for (tag, value) in [
            ("ixx", i[(0, 0)]),
            ("ixy", i[(0, 1)]),
            ("ixz", i[(0, 2)]),
            ("iyy", i[(1, 1)]),
            ("iyz", i[(1, 2)]),
            ("izz", i[(2, 2)]),
        ] {
            self.write_line(&format!("<{tag}>{value}</{tag}>"));
        }
        self.indent -= 1;
        self.write_line("</inertia>");
        self.indent -= 1;
        self.write_line("</inertial>");
    }

    fn write_joint(&mut self, joint: &UrdfJoint) {
        let kind = match joint.kind {
            UrdfJointKind::Revolute | UrdfJointKind::Continuous => "revolute",
            UrdfJointKind::Prismatic => "prismatic",
            // Floating and planar joints are rejected in `new`.
            UrdfJointKind::Fixed | UrdfJointKind::Floating | UrdfJointKind::Planar => "fixed",
        };
        self.write_line(&format!(
            r#"<joint name="{}" type="{kind}">"#,
            escape(&joint.name)
        ));
        self.indent += 1;
        self.write_line(&format!("<parent>{}</parent>", escape(&joint.parent)));
        self.write_line(&format!("<child>{}</child>", escape(&joint.child)));

        if kind != "fixed" {
            let a = joint.axis;
            self.write_line("<axis>");
            self.indent += 1;
            self.write_line(&format!("<xyz>{} {} {}</xyz>", a.x, a.y, a.z));
            let mut limit = String::new();
            if let Some(l) = &joint.limit {
                if joint.kind != UrdfJointKind::Continuous {
                    let _ = write!(limit, "<lower>{}</lower><upper>{}</upper>", l.lower, l.upper);
                }
                if l.effort > 0.0 {
                    let _ = write!(limit, "<effort>{}</effort>", l.effort);
                }
                if l.velocity > 0.0 {
                    let _ = write!(limit, "<velocity>{}</velocity>", l.velocity);
                }
            }
            if !limit.is_empty() {
                self.write_line(&format!("<limit>{limit}</limit>"));
            }
            if joint.damping != 0.0 || joint.friction != 0.0 {
                self.write_line(&format!(
                    "<dynamics><damping>{}</damping><friction>{}</friction></dynamics>",
                    joint.damping, joint.friction
                ));
            }
            self.indent -= 1;
            self.write_line("</axis>");
        }

        self.indent -= 1;
        self.write_line("</joint>");
    }

    fn write_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }
}

fn format_pose(pose: &Pose) -> String {
    let p = pose.position;
    let r = pose.rpy();
    format!("{} {} {} {} {} {}", p.x, p.y, p.z, r.x, r.y, r.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::extract_model_name;
    use crate::sdf::{parse_model, JointKind};
    use approx::assert_relative_eq;

    const ARM: &str = r#"<?xml version="1.0"?>
        <robot name="two_link_arm">
          <link name="world"/>
          <link name="base">
            <inertial><mass value="5"/><inertia ixx="1" iyy="1" izz="1"/></inertial>
          </link>
          <link name="upper">
            <inertial>
              <origin xyz="0 0 0.25"/>
              <mass value="1"/>
              <inertia ixx="0.02" iyy="0.02" izz="0.001"/>
            </inertial>
          </link>
          <link name="fore">
            <inertial><mass value="0.5"/><inertia ixx="0.01" iyy="0.01" izz="0.001"/></inertial>
          </link>
          <joint name="anchor" type="fixed">
            <parent link="world"/><child link="base"/>
          </joint>
          <joint name="shoulder" type="revolute">
            <parent link="base"/><child link="upper"/>
            <origin xyz="0 0 0.1"/>
            <axis xyz="0 1 0"/>
            <limit lower="-1.57" upper="1.57" effort="20" velocity="3"/>
            <dynamics damping="0.2"/>
          </joint>
          <joint name="elbow" type="continuous">
            <parent link="upper"/><child link="fore"/>
            <origin xyz="0 0 0.5" rpy="0 0 1.5707963267948966"/>
            <axis xyz="1 0 0"/>
          </joint>
        </robot>"#;

    #[test]
    fn converted_arm_parses_as_sdf() {
        let sdf = convert_legacy_description(ARM).unwrap();
        assert_eq!(extract_model_name(&sdf).unwrap(), "two_link_arm");

        let model = parse_model(&sdf).unwrap();
        assert!(model.link("world").is_none());
        assert_eq!(model.links.len(), 3);
        assert_eq!(model.joint("anchor").unwrap().parent, "world");

        let shoulder = model.joint("shoulder").unwrap();
        assert_eq!(shoulder.kind, JointKind::Revolute);
        assert_relative_eq!(shoulder.axis.lower, -1.57);
        assert_relative_eq!(shoulder.axis.effort, 20.0);
        assert_relative_eq!(shoulder.axis.damping, 0.2);

        let elbow = model.joint("elbow").unwrap();
        assert_eq!(elbow.kind, JointKind::Revolute);
        assert!(elbow.axis.upper >= 1e15);
        assert_relative_eq!(elbow.axis.xyz, nalgebra::Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn link_poses_are_composed_along_the_chain() {
        let model = parse_model(&convert_legacy_description(ARM).unwrap()).unwrap();
        assert_relative_eq!(model.link("upper").unwrap().pose.position.z, 0.1, epsilon = 1e-12);
        let fore = &model.link("fore").unwrap().pose;
        assert_relative_eq!(fore.position.z, 0.6, epsilon = 1e-12);
        assert_relative_eq!(fore.rpy().z, std::f64::consts::FRAC_PI_2, epsilon = 1e-9);

        let upper = model.link("upper").unwrap();
        assert_relative_eq!(upper.inertial.pose.position.z, 0.25, epsilon = 1e-12);
        assert_relative_eq!(upper.inertial.inertia[(2, 2)], 0.001);
    }

    #[test]
    fn unparsable_input_yields_no_output() {
        assert!(convert_legacy_description("<robot name='r'><link name='a'>").is_err());
        assert!(convert_legacy_description("not xml at all").is_err());
        assert!(convert_legacy_description("").is_err());
    }

    #[test]
    fn cycle_without_root_is_rejected() {
        let text = "<robot name='r'><link name='a'/><link name='b'/>
            <joint name='ab' type='fixed'><parent link='a'/><child link='b'/></joint>
            <joint name='ba' type='fixed'><parent link='b'/><child link='a'/></joint>
            </robot>";
        assert_eq!(
            convert_legacy_description(text),
            Err(DescriptionError::NoRootLink)
        );
    }

    #[test]
    fn floating_joint_is_unsupported() {
        let text = "<robot name='r'><link name='a'/><link name='b'/>
            <joint name='f' type='floating'><parent link='a'/><child link='b'/></joint>
            </robot>";
        assert!(matches!(
            convert_legacy_description(text),
            Err(DescriptionError::Unsupported { .. })
        ));
    }

    #[test]
    fn undefined_link_is_reported() {
        let text = "<robot name='r'><link name='a'/>
            <joint name='j' type='fixed'><parent link='a'/><child link='ghost'/></joint>
            </robot>";
        assert!(matches!(
            convert_legacy_description(text),
            Err(DescriptionError::UndefinedLink { .. })
        ));
    }

    #[test]
    fn names_are_escaped() {
        let sdf =
            convert_legacy_description("<robot name='a&amp;b'><link name='l'/></robot>").unwrap();
        assert!(sdf.contains(r#"<model name="a&amp;b">"#));
        assert_eq!(extract_model_name(&sdf).unwrap(), "a&b");
    }
}
