//! SDF model and world descriptions.
//!
//! Only the subset of SDF needed to simulate articulated models is
//! interpreted: link poses and inertials, single-axis joints with limits
//! and dynamics, world physics settings, gravity, inline models and
//! `<include>`s. Visual, collision, sensor and plugin elements are
//! accepted and ignored.

use indexmap::IndexSet;
use nalgebra::{Matrix3, Vector3};
use rigsim_core::Pose;

use crate::error::DescriptionError;
use crate::xml::{parse_bool, parse_document, parse_f64, parse_floats, XmlElement};

/// Default lower/upper joint limit magnitude: effectively unlimited.
pub const UNLIMITED: f64 = 1e16;

// ── Model ───────────────────────────────────────────────────────

/// A parsed SDF `<model>`.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelDescription {
    /// Declared model name.
    pub name: String,
    /// Static models never move.
    pub is_static: bool,
    /// Model frame relative to the world.
    pub pose: Pose,
    /// Links in declaration order.
    pub links: Vec<LinkDescription>,
    /// Joints in declaration order.
    pub joints: Vec<JointDescription>,
}

impl ModelDescription {
    /// Looks a link up by name.
    pub fn link(&self, name: &str) -> Option<&LinkDescription> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Looks a joint up by name.
    pub fn joint(&self, name: &str) -> Option<&JointDescription> {
        self.joints.iter().find(|j| j.name == name)
    }
}

/// A parsed SDF `<link>`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkDescription {
    /// Declared link name.
    pub name: String,
    /// Link frame relative to the model frame.
    pub pose: Pose,
    /// Mass properties.
    pub inertial: InertialDescription,
}

/// Mass properties of a link.
#[derive(Clone, Debug, PartialEq)]
pub struct InertialDescription {
    /// Mass in kilograms.
    pub mass: f64,
    /// Centre of mass frame relative to the link frame.
    pub pose: Pose,
    /// Inertia tensor about the centre of mass, in the inertial frame.
    pub inertia: Matrix3<f64>,
}

impl Default for InertialDescription {
    fn default() -> Self {
        Self {
            mass: 1.0,
            pose: Pose::identity(),
            inertia: Matrix3::identity(),
        }
    }
}

/// Supported single-degree-of-freedom joint types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JointKind {
    /// Rotation about an axis, within limits.
    Revolute,
    /// Rotation about an axis, unlimited.
    Continuous,
    /// Translation along an axis.
    Prismatic,
    /// Rigid attachment; no degree of freedom.
    Fixed,
}

impl JointKind {
    /// The SDF `type` attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revolute => "revolute",
            Self::Continuous => "continuous",
            Self::Prismatic => "prismatic",
            Self::Fixed => "fixed",
        }
    }
}

/// The controlled axis of a joint, with its limits and dynamics.
#[derive(Clone, Debug, PartialEq)]
pub struct JointAxisDescription {
    /// Unit axis direction, in the joint frame.
    pub xyz: Vector3<f64>,
    /// Lower position limit.
    pub lower: f64,
    /// Upper position limit.
    pub upper: f64,
    /// Maximum absolute effort; negative means unlimited.
    pub effort: f64,
    /// Maximum absolute velocity; negative means unlimited.
    pub velocity: f64,
    /// Viscous damping coefficient.
    pub damping: f64,
    /// Coulomb friction magnitude.
    pub friction: f64,
}

impl Default for JointAxisDescription {
    fn default() -> Self {
        Self {
            xyz: Vector3::z(),
            lower: -UNLIMITED,
            upper: UNLIMITED,
            effort: -1.0,
            velocity: -1.0,
            damping: 0.0,
            friction: 0.0,
        }
    }
}

/// A parsed SDF `<joint>`.
#[derive(Clone, Debug, PartialEq)]
pub struct JointDescription {
    /// Declared joint name.
    pub name: String,
    /// Joint type.
    pub kind: JointKind,
    /// Parent link name, or `"world"`.
    pub parent: String,
    /// Child link name.
    pub child: String,
    /// Joint frame relative to the child link frame.
    pub pose: Pose,
    /// Controlled axis.
    pub axis: JointAxisDescription,
}

/// Parses the first `<model>` of an SDF document.
pub fn parse_model(text: &str) -> Result<ModelDescription, DescriptionError> {
    let root = sdf_root(text)?;
    model_from_element(root.require_child("model")?)
}

pub(crate) fn model_from_element(el: &XmlElement) -> Result<ModelDescription, DescriptionError> {
    let name = el.require_attr("name")?.to_string();
    let is_static = match el.child_text("static") {
        Some(text) => parse_bool(&format!("model '{name}' <static>"), text)?,
        None => false,
    };
    let pose = optional_pose(el, &format!("model '{name}'"))?;

    let mut links = Vec::new();
    let mut seen = IndexSet::new();
    for link_el in el.children_named("link") {
        let link = link_from_element(link_el)?;
        if !seen.insert(link.name.clone()) {
            return Err(DescriptionError::invalid_value(
                format!("model '{name}' link name"),
                &link.name,
            ));
        }
        links.push(link);
    }
    if links.is_empty() {
        return Err(DescriptionError::missing_element(
            "link",
            &format!("model '{name}'"),
        ));
    }

    let mut joints = Vec::new();
    for joint_el in el.children_named("joint") {
        let joint = joint_from_element(joint_el)?;
        if joint.parent != "world" && !seen.contains(&joint.parent) {
            return Err(DescriptionError::UndefinedLink {
                joint: joint.name,
                link: joint.parent,
            });
        }
        if !seen.contains(&joint.child) {
            return Err(DescriptionError::UndefinedLink {
                joint: joint.name,
                link: joint.child,
            });
        }
        joints.push(joint);
    }

    Ok(ModelDescription {
        name,
        is_static,
        pose,
        links,
        joints,
    })
}

fn link_from_element(el: &XmlElement) -> Result<LinkDescription, DescriptionError> {
    let name = el.require_attr("name")?.to_string();
    let pose = optional_pose(el, &format!("link '{name}'"))?;
    let inertial = match el.child("inertial") {
        Some(inertial) => inertial_from_element(inertial, &name)?,
        None => InertialDescription::default(),
    };
    Ok(LinkDescription {
        name,
        pose,
        inertial,
    })
}

fn inertial_from_element(
    el: &XmlElement,
    link: &str,
) -> Result<InertialDescription, DescriptionError> {
    let mut inertial = InertialDescription::default();
    if let Some(mass) = el.child_text("mass") {
        inertial.mass = parse_f64(&format!("link '{link}' <mass>"), mass)?;
        if !(inertial.mass > 0.0) {
            return Err(DescriptionError::invalid_value(
                format!("link '{link}' <mass>"),
                mass,
            ));
        }
    }
    inertial.pose = optional_pose(el, &format!("link '{link}' <inertial>"))?;
    if let Some(tensor) = el.child("inertia") {
        let read = |tag: &str, default: f64| -> Result<f64, DescriptionError> {
            match tensor.child_text(tag) {
                Some(text) => parse_f64(&format!("link '{link}' <{tag}>"), text),
                None => Ok(default),
            }
        };
        let (ixx, iyy, izz) = (read("ixx", 1.0)?, read("iyy", 1.0)?, read("izz", 1.0)?);
        let (ixy, ixz, iyz) = (read("ixy", 0.0)?, read("ixz", 0.0)?, read("iyz", 0.0)?);
        inertial.inertia = Matrix3::new(ixx, ixy, ixz, ixy, iyy, iyz, ixz, iyz, izz);
    }
    Ok(inertial)
}

fn joint_from_element(el: &XmlElement) -> Result<JointDescription, DescriptionError> {
    let name = el.require_attr("name")?.to_string();
    let kind = parse_joint_kind(&name, el.require_attr("type")?)?;
    let parent = el.require_child("parent")?.text.clone();
    let child = el.require_child("child")?.text.clone();
    let pose = optional_pose(el, &format!("joint '{name}'"))?;

    let mut axis = JointAxisDescription::default();
    if let Some(axis_el) = el.child("axis") {
        let field = |tag: &str| format!("joint '{name}' <axis><{tag}>");
        if let Some(xyz) = axis_el.child_text("xyz") {
            let [x, y, z] = parse_floats::<3>(&field("xyz"), xyz)?;
            let v = Vector3::new(x, y, z);
            if !(v.norm() > 0.0) {
                return Err(DescriptionError::invalid_value(field("xyz"), xyz));
            }
            axis.xyz = v.normalize();
        }
        let in_model_frame = match axis_el.child_text("use_parent_model_frame") {
            Some(text) => parse_bool(&field("use_parent_model_frame"), text)?,
            None => false,
        };
        if in_model_frame {
            return Err(DescriptionError::Unsupported {
                feature: format!("joint '{name}': use_parent_model_frame axes"),
            });
        }
        if let Some(limit) = axis_el.child("limit") {
            let read = |tag: &str, current: f64| -> Result<f64, DescriptionError> {
                match limit.child_text(tag) {
                    Some(text) => parse_f64(&field(&format!("limit><{tag}")), text),
                    None => Ok(current),
                }
            };
            if kind != JointKind::Continuous {
                axis.lower = read("lower", axis.lower)?;
                axis.upper = read("upper", axis.upper)?;
            }
            axis.effort = read("effort", axis.effort)?;
            axis.velocity = read("velocity", axis.velocity)?;
        }
        if let Some(dynamics) = axis_el.child("dynamics") {
            let read = |tag: &str| -> Result<f64, DescriptionError> {
                match dynamics.child_text(tag) {
                    Some(text) => parse_f64(&field(&format!("dynamics><{tag}")), text),
                    None => Ok(0.0),
                }
            };
            axis.damping = read("damping")?;
            axis.friction = read("friction")?;
        }
    }
    if axis.lower > axis.upper {
        return Err(DescriptionError::invalid_value(
            format!("joint '{name}' limits"),
            &format!("{} > {}", axis.lower, axis.upper),
        ));
    }

    Ok(JointDescription {
        name,
        kind,
        parent,
        child,
        pose,
        axis,
    })
}

fn parse_joint_kind(joint: &str, kind: &str) -> Result<JointKind, DescriptionError> {
    match kind {
        "revolute" => Ok(JointKind::Revolute),
        "continuous" => Ok(JointKind::Continuous),
        "prismatic" => Ok(JointKind::Prismatic),
        "fixed" => Ok(JointKind::Fixed),
        "ball" | "universal" | "revolute2" | "screw" | "gearbox" => {
            Err(DescriptionError::Unsupported {
                feature: format!("joint '{joint}' of type '{kind}'"),
            })
        }
        other => Err(DescriptionError::UnknownJointType {
            joint: joint.to_string(),
            kind: other.to_string(),
        }),
    }
}

// ── World ───────────────────────────────────────────────────────

/// Physics settings of a world.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsDescription {
    /// The `type` attribute, e.g. `ode`.
    pub kind: String,
    /// Simulated seconds per tick.
    pub max_step_size: f64,
    /// Target ticks per wall-clock second; `0` means unconstrained.
    pub real_time_update_rate: f64,
    /// Target ratio of simulated to wall-clock time.
    pub real_time_factor: f64,
    /// Standard deviation of Gaussian noise added to every commanded
    /// joint effort, read from `<effort_noise>`. Zero disables noise.
    pub effort_noise: f64,
}

impl Default for PhysicsDescription {
    fn default() -> Self {
        Self {
            kind: "ode".to_string(),
            max_step_size: 0.001,
            real_time_update_rate: 1000.0,
            real_time_factor: 1.0,
            effort_noise: 0.0,
        }
    }
}

/// A world `<include>` of a model from the model search paths.
#[derive(Clone, Debug, PartialEq)]
pub struct IncludeDescription {
    /// The include URI, e.g. `model://ground_plane`.
    pub uri: String,
    /// Name override for the included model.
    pub name: Option<String>,
    /// Pose override for the included model.
    pub pose: Option<Pose>,
    /// Static override for the included model.
    pub is_static: Option<bool>,
}

impl IncludeDescription {
    /// The model directory name for `model://` URIs.
    pub fn model_uri_name(&self) -> Option<&str> {
        self.uri
            .strip_prefix("model://")
            .map(|rest| rest.trim_end_matches('/'))
    }
}

/// A parsed SDF `<world>`.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldDescription {
    /// Declared world name.
    pub name: String,
    /// Physics settings.
    pub physics: PhysicsDescription,
    /// Gravity vector in the world frame.
    pub gravity: Vector3<f64>,
    /// Included models, in declaration order.
    pub includes: Vec<IncludeDescription>,
    /// Inline models, in declaration order.
    pub models: Vec<ModelDescription>,
}

impl Default for WorldDescription {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            physics: PhysicsDescription::default(),
            gravity: Vector3::new(0.0, 0.0, -9.8),
            includes: Vec::new(),
            models: Vec::new(),
        }
    }
}

/// Parses the first `<world>` of an SDF document.
pub fn parse_world(text: &str) -> Result<WorldDescription, DescriptionError> {
    let root = sdf_root(text)?;
    let el = root.require_child("world")?;
    let mut world = WorldDescription {
        name: el.require_attr("name")?.to_string(),
        ..WorldDescription::default()
    };

    if let Some(physics) = el.child("physics") {
        let p = &mut world.physics;
        if let Some(kind) = physics.attr("type") {
            p.kind = kind.to_string();
        }
        let read = |tag: &str, current: f64| -> Result<f64, DescriptionError> {
            match physics.child_text(tag) {
                Some(text) => parse_f64(&format!("<physics><{tag}>"), text),
                None => Ok(current),
            }
        };
        p.max_step_size = read("max_step_size", p.max_step_size)?;
        p.real_time_update_rate = read("real_time_update_rate", p.real_time_update_rate)?;
        p.real_time_factor = read("real_time_factor", p.real_time_factor)?;
        p.effort_noise = read("effort_noise", p.effort_noise)?;
        if !(p.max_step_size > 0.0) {
            return Err(DescriptionError::invalid_value(
                "<physics><max_step_size>",
                &p.max_step_size.to_string(),
            ));
        }
        if !(p.effort_noise >= 0.0) {
            return Err(DescriptionError::invalid_value(
                "<physics><effort_noise>",
                &p.effort_noise.to_string(),
            ));
        }
        if let Some(g) = physics.child_text("gravity") {
            world.gravity = Vector3::from(parse_floats::<3>("<physics><gravity>", g)?);
        }
    }
    if let Some(g) = el.child_text("gravity") {
        world.gravity = Vector3::from(parse_floats::<3>("<world><gravity>", g)?);
    }

    for inc in el.children_named("include") {
        let uri = inc.require_child("uri")?.text.clone();
        let pose = match inc.child("pose") {
            Some(p) => Some(pose_from_element(p, "<include><pose>")?),
            None => None,
        };
        let is_static = match inc.child_text("static") {
            Some(text) => Some(parse_bool("<include><static>", text)?),
            None => None,
        };
        world.includes.push(IncludeDescription {
            uri,
            name: inc.child_text("name").map(str::to_string),
            pose,
            is_static,
        });
    }
    for model in el.children_named("model") {
        world.models.push(model_from_element(model)?);
    }
    Ok(world)
}

// ── Helpers ─────────────────────────────────────────────────────

fn sdf_root(text: &str) -> Result<XmlElement, DescriptionError> {
    let root = parse_document(text)?;
    if root.name != "sdf" {
        return Err(DescriptionError::missing_element("sdf", "document root"));
    }
    Ok(root)
}

fn optional_pose(el: &XmlElement, context: &str) -> Result<Pose, DescriptionError> {
    match el.child("pose") {
        Some(p) => pose_from_element(p, &format!("{context} <pose>")),
        None => Ok(Pose::identity()),
    }
}

fn pose_from_element(el: &XmlElement, field: &str) -> Result<Pose, DescriptionError> {
    for frame_attr in ["frame", "relative_to"] {
        if el.attr(frame_attr).is_some_and(|f| !f.is_empty()) {
            return Err(DescriptionError::Unsupported {
                feature: format!("{field} with explicit '{frame_attr}'"),
            });
        }
    }
    if el.text.is_empty() {
        return Ok(Pose::identity());
    }
    Ok(Pose::from_xyz_rpy(parse_floats::<6>(field, &el.text)?))
}
