//! URDF robot descriptions.

use nalgebra::{Matrix3, Vector3};
use rigsim_core::Pose;

use crate::error::DescriptionError;
use crate::xml::{parse_document, parse_f64, parse_floats, XmlElement};

/// A parsed URDF `<robot>`.
#[derive(Clone, Debug, PartialEq)]
pub struct UrdfRobot {
    /// Robot name.
    pub name: String,
    /// Links in declaration order.
    pub links: Vec<UrdfLink>,
    /// Joints in declaration order.
    pub joints: Vec<UrdfJoint>,
}

/// A URDF `<link>`.
#[derive(Clone, Debug, PartialEq)]
pub struct UrdfLink {
    /// Link name.
    pub name: String,
    /// Mass properties, if declared.
    pub inertial: Option<UrdfInertial>,
}

/// A URDF `<inertial>` block.
#[derive(Clone, Debug, PartialEq)]
pub struct UrdfInertial {
    /// Centre of mass frame relative to the link frame.
    pub origin: Pose,
    /// Mass in kilograms.
    pub mass: f64,
    /// Inertia tensor about the centre of mass.
    pub inertia: Matrix3<f64>,
}

/// URDF joint types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UrdfJointKind {
    /// Hinge with limits.
    Revolute,
    /// Hinge without limits.
    Continuous,
    /// Slider with limits.
    Prismatic,
    /// Rigid attachment.
    Fixed,
    /// Six degrees of freedom.
    Floating,
    /// Motion in a plane.
    Planar,
}

/// A URDF `<limit>`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UrdfLimit {
    /// Lower position limit.
    pub lower: f64,
    /// Upper position limit.
    pub upper: f64,
    /// Maximum absolute effort.
    pub effort: f64,
    /// Maximum absolute velocity.
    pub velocity: f64,
}

/// A URDF `<joint>`.
#[derive(Clone, Debug, PartialEq)]
pub struct UrdfJoint {
    /// Joint name.
    pub name: String,
    /// Joint type.
    pub kind: UrdfJointKind,
    /// Parent link name.
    pub parent: String,
    /// Child link name.
    pub child: String,
    /// Child frame relative to the parent link frame.
    pub origin: Pose,
    /// Unit axis in the joint frame.
    pub axis: Vector3<f64>,
    /// Limits, if declared.
    pub limit: Option<UrdfLimit>,
    /// Viscous damping.
    pub damping: f64,
    /// Coulomb friction.
    pub friction: f64,
}

/// Parses URDF text.
pub fn parse_urdf(text: &str) -> Result<UrdfRobot, DescriptionError> {
    let root = parse_document(text)?;
    if root.name != "robot" {
        return Err(DescriptionError::missing_element("robot", "document root"));
    }
    let name = root.require_attr("name")?.to_string();
    let links = root
        .children_named("link")
        .map(parse_link)
        .collect::<Result<Vec<_>, _>>()?;
    let joints = root
        .children_named("joint")
        .map(parse_joint)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(UrdfRobot {
        name,
        links,
        joints,
    })
}

fn parse_link(el: &XmlElement) -> Result<UrdfLink, DescriptionError> {
    let name = el.require_attr("name")?.to_string();
    let inertial = match el.child("inertial") {
        Some(i) => {
            let field = |what: &str| format!("link '{name}' <inertial> {what}");
            let mass_el = i.require_child("mass")?;
            let mass = parse_f64(&field("mass"), mass_el.require_attr("value")?)?;
            let inertia = match i.child("inertia") {
                Some(t) => {
                    let read = |attr: &str| -> Result<f64, DescriptionError> {
                        match t.attr(attr) {
                            Some(v) => parse_f64(&field(attr), v),
                            None => Ok(0.0),
                        }
                    };
                    let (ixx, iyy, izz) = (read("ixx")?, read("iyy")?, read("izz")?);
                    let (ixy, ixz, iyz) = (read("ixy")?, read("ixz")?, read("iyz")?);
                    Matrix3::new(ixx, ixy, ixz, ixy, iyy, iyz, ixz, iyz, izz)
                }
                None => Matrix3::zeros(),
            };
            Some(UrdfInertial {
                origin: parse_origin(i.child("origin"), &field("origin"))?,
                mass,
                inertia,
            })
        }
        None => None,
    };
    Ok(UrdfLink { name, inertial })
}

fn parse_joint(el: &XmlElement) -> Result<UrdfJoint, DescriptionError> {
    let name = el.require_attr("name")?.to_string();
    let kind = match el.require_attr("type")? {
        "revolute" => UrdfJointKind::Revolute,
        "continuous" => UrdfJointKind::Continuous,
        "prismatic" => UrdfJointKind::Prismatic,
        "fixed" => UrdfJointKind::Fixed,
        "floating" => UrdfJointKind::Floating,
        "planar" => UrdfJointKind::Planar,
        other => {
            return Err(DescriptionError::UnknownJointType {
                joint: name,
                kind: other.to_string(),
            })
        }
    };
    let field = |what: &str| format!("joint '{name}' {what}");
    let parent = el.require_child("parent")?.require_attr("link")?.to_string();
    let child = el.require_child("child")?.require_attr("link")?.to_string();
    let origin = parse_origin(el.child("origin"), &field("<origin>"))?;

    let axis = match el.child("axis").and_then(|a| a.attr("xyz")) {
        Some(xyz) => {
            let v = Vector3::from(parse_floats::<3>(&field("<axis>"), xyz)?);
            if !(v.norm() > 0.0) {
                return Err(DescriptionError::invalid_value(field("<axis>"), xyz));
            }
            v.normalize()
        }
        None => Vector3::x(),
    };

    let limit = match el.child("limit") {
        Some(l) => {
            let read = |attr: &str| -> Result<f64, DescriptionError> {
                match l.attr(attr) {
                    Some(v) => parse_f64(&field(&format!("<limit> {attr}")), v),
                    None => Ok(0.0),
                }
            };
            Some(UrdfLimit {
                lower: read("lower")?,
                upper: read("upper")?,
                effort: read("effort")?,
                velocity: read("velocity")?,
            })
        }
        None => None,
    };

    let (mut damping, mut friction) = (0.0, 0.0);
    if let Some(d) = el.child("dynamics") {
        if let Some(v) = d.attr("damping") {
            damping = parse_f64(&field("<dynamics> damping"), v)?;
        }
        if let Some(v) = d.attr("friction") {
            friction = parse_f64(&field("<dynamics> friction"), v)?;
        }
    }

    Ok(UrdfJoint {
        name,
        kind,
        parent,
        child,
        origin,
        axis,
        limit,
        damping,
        friction,
    })
}

fn parse_origin(el: Option<&XmlElement>, field: &str) -> Result<Pose, DescriptionError> {
    let Some(el) = el else {
        return Ok(Pose::identity());
    };
    let xyz = match el.attr("xyz") {
        Some(v) => Vector3::from(parse_floats::<3>(field, v)?),
        None => Vector3::zeros(),
    };
    let rpy = match el.attr("rpy") {
        Some(v) => Vector3::from(parse_floats::<3>(field, v)?),
        None => Vector3::zeros(),
    };
    Ok(Pose::from_position_rpy(xyz, rpy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_robot_tree() {
        let robot = parse_urdf(
            r#"<robot name="pendulum">
                 <link name="base"/>
                 <link name="bob">
                   <inertial>
                     <origin xyz="0 0 -0.5"/>
                     <mass value="2"/>
                     <inertia ixx="0.1" iyy="0.1" izz="0.01"/>
                   </inertial>
                 </link>
                 <joint name="pivot" type="continuous">
                   <parent link="base"/>
                   <child link="bob"/>
                   <origin xyz="0 0 1" rpy="0 0 0"/>
                   <axis xyz="0 1 0"/>
                   <dynamics damping="0.05"/>
                 </joint>
               </robot>"#,
        )
        .unwrap();
        assert_eq!(robot.name, "pendulum");
        assert_eq!(robot.links.len(), 2);
        assert!(robot.links[0].inertial.is_none());
        let bob = robot.links[1].inertial.as_ref().unwrap();
        assert_relative_eq!(bob.mass, 2.0);
        assert_relative_eq!(bob.origin.position.z, -0.5);
        assert_relative_eq!(bob.inertia[(2, 2)], 0.01);

        let pivot = &robot.joints[0];
        assert_eq!(pivot.kind, UrdfJointKind::Continuous);
        assert_relative_eq!(pivot.axis, Vector3::y());
        assert_relative_eq!(pivot.origin.position.z, 1.0);
        assert_relative_eq!(pivot.damping, 0.05);
        assert!(pivot.limit.is_none());
    }

    #[test]
    fn axis_defaults_to_x() {
        let robot = parse_urdf(
            "<robot name='r'><link name='a'/><link name='b'/>
             <joint name='j' type='revolute'><parent link='a'/><child link='b'/>
             <limit lower='-1' upper='1' effort='5' velocity='2'/></joint></robot>",
        )
        .unwrap();
        assert_relative_eq!(robot.joints[0].axis, Vector3::x());
        assert_eq!(
            robot.joints[0].limit,
            Some(UrdfLimit {
                lower: -1.0,
                upper: 1.0,
                effort: 5.0,
                velocity: 2.0
            })
        );
    }

    #[test]
    fn rejects_non_robot_root() {
        assert!(matches!(
            parse_urdf("<sdf/>"),
            Err(DescriptionError::MissingElement { .. })
        ));
    }

    #[test]
    fn rejects_unknown_joint_type() {
        let text = "<robot name='r'><joint name='j' type='spring'>
            <parent link='a'/><child link='b'/></joint></robot>";
        assert!(matches!(
            parse_urdf(text),
            Err(DescriptionError::UnknownJointType { .. })
        ));
    }

    #[test]
    fn joint_requires_link_attribute() {
        let text = "<robot name='r'><joint name='j' type='fixed'>
            <parent/><child link='b'/></joint></robot>";
        assert!(matches!(
            parse_urdf(text),
            Err(DescriptionError::MissingAttribute { .. })
        ));
    }
}
