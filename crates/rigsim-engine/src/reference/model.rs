//! Articulated model state and per-tick integration.

use indexmap::IndexMap;
use nalgebra::{Matrix3, Unit, UnitQuaternion, Vector3};
use rigsim_core::Pose;
use rigsim_description::{JointKind, ModelDescription};
use smallvec::SmallVec;
use tracing::debug;

use super::noise::EffortNoise;
use crate::world::{ActuatorState, BodyState};

/// Lower bound on effective axis inertia, keeping massless chains finite.
const MIN_AXIS_INERTIA: f64 = 1e-6;

/// Per-tick inputs shared by every model in a world.
pub(crate) struct TickContext<'a> {
    pub dt: f64,
    pub gravity: Vector3<f64>,
    pub ground_plane: bool,
    pub quiet: bool,
    pub noise: &'a mut EffortNoise,
}

pub(crate) struct Link {
    /// Link frame in the model frame at zero joint positions.
    rest: Pose,
    mass: f64,
    /// Centre of mass in the link frame.
    com: Vector3<f64>,
    /// Inertia about the centre of mass, expressed in the link frame.
    inertia: Matrix3<f64>,
    parent_joint: Option<usize>,
    child_joints: SmallVec<[usize; 4]>,
    world: Pose,
    linear_velocity: Vector3<f64>,
    angular_velocity: Vector3<f64>,
    linear_acceleration: Vector3<f64>,
    angular_acceleration: Vector3<f64>,
}

pub(crate) struct Joint {
    kind: JointKind,
    /// Parent link index; `None` attaches to the world.
    parent: Option<usize>,
    child: usize,
    /// Joint frame relative to the child link frame.
    frame: Pose,
    /// Unit axis in the joint frame.
    axis: Unit<Vector3<f64>>,
    lower: f64,
    upper: f64,
    effort_limit: f64,
    velocity_limit: f64,
    damping: f64,
    friction: f64,
    position: f64,
    velocity: f64,
    /// Last commanded effort, reported back to readers.
    commanded: f64,
    /// Effort applied on the next tick, then cleared.
    pending: f64,
}

impl Joint {
    fn is_actuated(&self) -> bool {
        !matches!(self.kind, JointKind::Fixed)
    }

    fn has_position_limits(&self) -> bool {
        matches!(self.kind, JointKind::Revolute | JointKind::Prismatic)
    }

    fn motion(&self) -> Pose {
        match self.kind {
            JointKind::Revolute | JointKind::Continuous => Pose::new(
                Vector3::zeros(),
                UnitQuaternion::from_axis_angle(&self.axis, self.position),
            ),
            JointKind::Prismatic => {
                Pose::new(self.axis.into_inner() * self.position, UnitQuaternion::identity())
            }
            JointKind::Fixed => Pose::identity(),
        }
    }
}

/// One materialized model: links, joints and the floating base.
pub(crate) struct ArticulatedModel {
    name: String,
    is_static: bool,
    /// True if the model is static or any joint attaches to the world.
    anchored: bool,
    links: IndexMap<String, Link>,
    joints: IndexMap<String, Joint>,
    /// Link indices with parents before children.
    order: Vec<usize>,
    pose: Pose,
    initial_pose: Pose,
    base_velocity: Vector3<f64>,
    pub(crate) body_offset: u32,
    pub(crate) actuator_offset: u32,
}

impl ArticulatedModel {
    pub(crate) fn from_description(desc: &ModelDescription) -> Result<Self, String> {
        let mut links = IndexMap::with_capacity(desc.links.len());
        for l in &desc.links {
            let inertial = &l.inertial;
            let r = inertial.pose.rotation_matrix();
            links.insert(
                l.name.clone(),
                Link {
                    rest: l.pose,
                    mass: inertial.mass,
                    com: inertial.pose.position,
                    inertia: r * inertial.inertia * r.transpose(),
                    parent_joint: None,
                    child_joints: SmallVec::new(),
                    world: Pose::identity(),
                    linear_velocity: Vector3::zeros(),
                    angular_velocity: Vector3::zeros(),
                    linear_acceleration: Vector3::zeros(),
                    angular_acceleration: Vector3::zeros(),
                },
            );
        }

        let mut joints = IndexMap::with_capacity(desc.joints.len());
        for (index, j) in desc.joints.iter().enumerate() {
            let parent = if j.parent == "world" {
                None
            } else {
                Some(
                    links
                        .get_index_of(&j.parent)
                        .ok_or_else(|| format!("joint '{}': unknown parent '{}'", j.name, j.parent))?,
                )
            };
            let child = links
                .get_index_of(&j.child)
                .ok_or_else(|| format!("joint '{}': unknown child '{}'", j.name, j.child))?;
            if parent == Some(child) {
                return Err(format!("joint '{}' connects link '{}' to itself", j.name, j.child));
            }
            let (_, child_link) = links
                .get_index_mut(child)
                .ok_or_else(|| format!("joint '{}': unknown child", j.name))?;
            if child_link.parent_joint.is_some() {
                return Err(format!("link '{}' has more than one parent joint", j.child));
            }
            child_link.parent_joint = Some(index);
            if let Some(p) = parent {
                if let Some((_, parent_link)) = links.get_index_mut(p) {
                    parent_link.child_joints.push(index);
                }
            }
            let axis = &j.axis;
            let previous = joints.insert(
                j.name.clone(),
                Joint {
                    kind: j.kind,
                    parent,
                    child,
                    frame: j.pose,
                    axis: Unit::new_normalize(axis.xyz),
                    lower: axis.lower,
                    upper: axis.upper,
                    effort_limit: axis.effort,
                    velocity_limit: axis.velocity,
                    damping: axis.damping,
                    friction: axis.friction,
                    position: 0.0,
                    velocity: 0.0,
                    commanded: 0.0,
                    pending: 0.0,
                },
            );
            if previous.is_some() {
                return Err(format!("duplicate joint name '{}'", j.name));
            }
        }

        let order = topological_order(&links, &joints)?;
        let anchored = desc.is_static || joints.values().any(|j| j.parent.is_none());

        let mut model = Self {
            name: desc.name.clone(),
            is_static: desc.is_static,
            anchored,
            links,
            joints,
            order,
            pose: desc.pose,
            initial_pose: desc.pose,
            base_velocity: Vector3::zeros(),
            body_offset: 0,
            actuator_offset: 0,
        };
        model.update_kinematics();
        Ok(model)
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn link_count(&self) -> usize {
        self.links.len()
    }

    pub(crate) fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub(crate) fn link_index(&self, name: &str) -> Option<usize> {
        self.links.get_index_of(name)
    }

    pub(crate) fn joint_index(&self, name: &str) -> Option<usize> {
        self.joints.get_index_of(name)
    }

    pub(crate) fn link_names(&self) -> Vec<String> {
        self.links.keys().cloned().collect()
    }

    pub(crate) fn joint_names(&self) -> Vec<String> {
        self.joints.keys().cloned().collect()
    }

    pub(crate) fn set_initial_pose(&mut self, pose: Pose) {
        self.initial_pose = pose;
    }

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.update_kinematics();
    }

    pub(crate) fn link_state(&self, index: usize) -> Option<BodyState> {
        self.links.get_index(index).map(|(_, l)| BodyState {
            pose: l.world,
            linear_velocity: l.linear_velocity,
            angular_velocity: l.angular_velocity,
            linear_acceleration: l.linear_acceleration,
            angular_acceleration: l.angular_acceleration,
        })
    }

    pub(crate) fn joint_state(&self, index: usize) -> Option<ActuatorState> {
        self.joints.get_index(index).map(|(_, j)| ActuatorState {
            position: j.position,
            velocity: j.velocity,
            effort: j.commanded,
        })
    }

    pub(crate) fn command_effort(&mut self, index: usize, effort: f64) -> bool {
        match self.joints.get_index_mut(index) {
            Some((_, j)) => {
                j.commanded = effort;
                j.pending = effort;
                true
            }
            None => false,
        }
    }

    /// Returns the model to its initial pose, at rest, with no effort.
    pub(crate) fn reset(&mut self) {
        self.pose = self.initial_pose;
        self.base_velocity = Vector3::zeros();
        for j in self.joints.values_mut() {
            j.position = 0.0;
            j.velocity = 0.0;
            j.commanded = 0.0;
            j.pending = 0.0;
        }
        for l in self.links.values_mut() {
            l.linear_velocity = Vector3::zeros();
            l.angular_velocity = Vector3::zeros();
            l.linear_acceleration = Vector3::zeros();
            l.angular_acceleration = Vector3::zeros();
        }
        self.update_kinematics();
    }

    /// Consumes pending efforts without integrating.
    pub(crate) fn skip_tick(&mut self) {
        for j in self.joints.values_mut() {
            j.pending = 0.0;
        }
    }

    /// Integrates one tick. Returns a description of the first non-finite
    /// state encountered.
    pub(crate) fn step(&mut self, ctx: &mut TickContext<'_>) -> Result<(), String> {
        if self.is_static {
            self.skip_tick();
            return Ok(());
        }
        let dt = ctx.dt;
        let before: Vec<(Pose, Vector3<f64>, Vector3<f64>)> = self
            .links
            .values()
            .map(|l| (l.world, l.linear_velocity, l.angular_velocity))
            .collect();

        let mut supported = self.anchored;
        if !self.anchored {
            self.base_velocity += ctx.gravity * dt;
            self.pose.position += self.base_velocity * dt;
            if ctx.ground_plane && self.pose.position.z <= 0.0 {
                self.pose.position.z = 0.0;
                self.base_velocity.z = self.base_velocity.z.max(0.0);
                supported = true;
            }
        }

        for index in 0..self.joints.len() {
            self.step_joint(index, supported, ctx);
        }

        self.update_kinematics();

        for (l, (pose, v0, w0)) in self.links.values_mut().zip(before) {
            let v = (l.world.position - pose.position) / dt;
            let w = (l.world.rotation * pose.rotation.inverse()).scaled_axis() / dt;
            l.linear_acceleration = (v - v0) / dt;
            l.angular_acceleration = (w - w0) / dt;
            l.linear_velocity = v;
            l.angular_velocity = w;
        }

        self.check_finite()
    }

    fn step_joint(&mut self, index: usize, supported: bool, ctx: &mut TickContext<'_>) {
        let Some((name, joint)) = self.joints.get_index(index) else {
            return;
        };
        if !joint.is_actuated() {
            return;
        }
        let Some((_, child)) = self.links.get_index(joint.child) else {
            return;
        };

        // Axis and anchor of the joint in the world, from the child link.
        let joint_world = child.world.compose(&joint.frame);
        let axis = joint_world.rotation * joint.axis.into_inner();
        let com = child.world.rotation * child.com + child.world.position;
        let lever = com - joint_world.position;

        let mut effort = joint.pending + ctx.noise.sample();
        if joint.effort_limit >= 0.0 {
            effort = effort.clamp(-joint.effort_limit, joint.effort_limit);
        }

        let (gravity_load, axis_inertia) = match joint.kind {
            JointKind::Prismatic => (axis.dot(&(child.mass * ctx.gravity)), child.mass),
            _ => {
                let r = child.world.rotation_matrix();
                let inertia = r * child.inertia * r.transpose();
                let perp = lever - axis * axis.dot(&lever);
                (
                    axis.dot(&lever.cross(&(child.mass * ctx.gravity))),
                    axis.dot(&(inertia * axis)) + child.mass * perp.norm_squared(),
                )
            }
        };
        let gravity_load = if supported { gravity_load } else { 0.0 };
        let axis_inertia = axis_inertia.max(MIN_AXIS_INERTIA);

        let qd = joint.velocity;
        let drive = effort + gravity_load - joint.damping * qd;
        let friction = if qd != 0.0 {
            joint.friction * qd.signum()
        } else if drive.abs() <= joint.friction {
            drive
        } else {
            joint.friction * drive.signum()
        };
        let qdd = (drive - friction) / axis_inertia;

        let mut velocity = qd + qdd * ctx.dt;
        if qd != 0.0 && velocity.signum() != qd.signum() && drive.abs() <= joint.friction {
            velocity = 0.0;
        }
        if joint.velocity_limit >= 0.0 {
            velocity = velocity.clamp(-joint.velocity_limit, joint.velocity_limit);
        }
        let mut position = joint.position + velocity * ctx.dt;
        if joint.has_position_limits() {
            if position < joint.lower {
                position = joint.lower;
                velocity = velocity.max(0.0);
                if !ctx.quiet {
                    debug!(model = %self.name, joint = %name, "lower limit reached");
                }
            } else if position > joint.upper {
                position = joint.upper;
                velocity = velocity.min(0.0);
                if !ctx.quiet {
                    debug!(model = %self.name, joint = %name, "upper limit reached");
                }
            }
        }

        if let Some((_, joint)) = self.joints.get_index_mut(index) {
            joint.position = position;
            joint.velocity = velocity;
            joint.pending = 0.0;
        }
    }

    /// Recomputes every link's world pose from the model pose and joint
    /// positions.
    fn update_kinematics(&mut self) {
        for &index in &self.order {
            let world = {
                let Some((_, link)) = self.links.get_index(index) else {
                    continue;
                };
                match link.parent_joint.and_then(|j| self.joints.get_index(j)) {
                    None => self.pose.compose(&link.rest),
                    Some((_, joint)) => {
                        // Maps the model frame at rest onto the parent's
                        // current placement in the world.
                        let parent_base = match joint.parent.and_then(|p| self.links.get_index(p)) {
                            Some((_, parent)) => parent.world.compose(&parent.rest.inverse()),
                            None => self.pose,
                        };
                        parent_base
                            .compose(&link.rest)
                            .compose(&joint.frame)
                            .compose(&joint.motion())
                            .compose(&joint.frame.inverse())
                    }
                }
            };
            if let Some((_, link)) = self.links.get_index_mut(index) {
                link.world = world;
            }
        }
    }

    fn check_finite(&self) -> Result<(), String> {
        for (name, l) in &self.links {
            let finite = l.world.position.iter().all(|v| v.is_finite())
                && l.world.rotation.coords.iter().all(|v| v.is_finite())
                && l.linear_velocity.iter().all(|v| v.is_finite())
                && l.angular_velocity.iter().all(|v| v.is_finite());
            if !finite {
                return Err(format!("link '{name}' of model '{}' has non-finite state", self.name));
            }
        }
        Ok(())
    }
}

/// Orders links so that every parent precedes its children.
fn topological_order(
    links: &IndexMap<String, Link>,
    joints: &IndexMap<String, Joint>,
) -> Result<Vec<usize>, String> {
    let mut order = Vec::with_capacity(links.len());
    let mut stack: Vec<usize> = links
        .values()
        .enumerate()
        .filter(|(_, l)| match l.parent_joint.and_then(|j| joints.get_index(j)) {
            None => true,
            Some((_, joint)) => joint.parent.is_none(),
        })
        .map(|(i, _)| i)
        .rev()
        .collect();
    while let Some(index) = stack.pop() {
        order.push(index);
        if let Some((_, link)) = links.get_index(index) {
            for &j in link.child_joints.iter().rev() {
                if let Some((_, joint)) = joints.get_index(j) {
                    stack.push(joint.child);
                }
            }
        }
    }
    if order.len() != links.len() {
        return Err("kinematic loop between links".to_string());
    }
    Ok(order)
}
