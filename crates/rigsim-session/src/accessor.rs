//! Non-owning views onto one body or actuator of the session's model.
//!
//! Accessors hold a [`Weak`] reference to the session's world plus the id
//! resolved when they were issued. Every query locks the world for the
//! duration of one read or write. After the session shuts down every
//! query returns [`SessionError::Invalidated`].

use std::sync::{Arc, Mutex, Weak};

use nalgebra::{Matrix3, Vector3};
use rigsim_core::{ActuatorId, BodyId};
use rigsim_engine::{ActuatorState, BodyState, World};

use crate::error::SessionError;

pub(crate) type SharedWorld = Arc<Mutex<Box<dyn World>>>;

/// Runs `f` against a locked world.
pub(crate) fn with_world<T>(
    world: &Mutex<Box<dyn World>>,
    f: impl FnOnce(&mut dyn World) -> Result<T, SessionError>,
) -> Result<T, SessionError> {
    let mut guard = world.lock().map_err(|_| SessionError::NotReady {
        reason: "world lock poisoned by an earlier panic".to_string(),
    })?;
    f(&mut **guard)
}

fn with_weak<T>(
    world: &Weak<Mutex<Box<dyn World>>>,
    f: impl FnOnce(&mut dyn World) -> Result<T, SessionError>,
) -> Result<T, SessionError> {
    let world = world.upgrade().ok_or(SessionError::Invalidated)?;
    with_world(&world, f)
}

// ── Body ────────────────────────────────────────────────────────────

/// A rigid body (link) of the session's model.
///
/// World-frame quantities are expressed in the world frame; relative
/// quantities are the same vectors expressed in the body frame.
#[derive(Clone, Debug)]
pub struct Body {
    name: String,
    id: BodyId,
    world: Weak<Mutex<Box<dyn World>>>,
}

impl Body {
    pub(crate) fn new(name: String, id: BodyId, world: &SharedWorld) -> Self {
        Self {
            name,
            id,
            world: Arc::downgrade(world),
        }
    }

    /// The link name this accessor was issued for.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> Result<BodyState, SessionError> {
        with_weak(&self.world, |w| w.body_state(self.id).map_err(SessionError::Engine))
    }

    /// Expresses a world-frame vector in the body frame.
    fn relative(
        &self,
        pick: impl FnOnce(&BodyState) -> Vector3<f64>,
    ) -> Result<Vector3<f64>, SessionError> {
        let s = self.state()?;
        Ok(s.pose.rotation.inverse_transform_vector(&pick(&s)))
    }

    /// Position and rotation matrix of the body frame in the world.
    pub fn world_pose(&self) -> Result<(Vector3<f64>, Matrix3<f64>), SessionError> {
        let s = self.state()?;
        Ok((s.pose.position, s.pose.rotation_matrix()))
    }

    /// Linear velocity in the world frame.
    pub fn world_linear_vel(&self) -> Result<Vector3<f64>, SessionError> {
        Ok(self.state()?.linear_velocity)
    }

    /// Angular velocity in the world frame.
    pub fn world_angular_vel(&self) -> Result<Vector3<f64>, SessionError> {
        Ok(self.state()?.angular_velocity)
    }

    /// Linear acceleration in the world frame.
    pub fn world_linear_accel(&self) -> Result<Vector3<f64>, SessionError> {
        Ok(self.state()?.linear_acceleration)
    }

    /// Angular acceleration in the world frame.
    pub fn world_angular_accel(&self) -> Result<Vector3<f64>, SessionError> {
        Ok(self.state()?.angular_acceleration)
    }

    /// Linear velocity in the body frame.
    pub fn relative_linear_vel(&self) -> Result<Vector3<f64>, SessionError> {
        self.relative(|s| s.linear_velocity)
    }

    /// Linear acceleration in the body frame.
    pub fn relative_linear_accel(&self) -> Result<Vector3<f64>, SessionError> {
        self.relative(|s| s.linear_acceleration)
    }

    /// Angular velocity in the body frame.
    pub fn relative_angular_vel(&self) -> Result<Vector3<f64>, SessionError> {
        self.relative(|s| s.angular_velocity)
    }

    /// Angular acceleration in the body frame.
    pub fn relative_angular_accel(&self) -> Result<Vector3<f64>, SessionError> {
        self.relative(|s| s.angular_acceleration)
    }
}

// ── Actuator ────────────────────────────────────────────────────────

/// A single-axis actuator (joint) of the session's model.
#[derive(Clone, Debug)]
pub struct Actuator {
    name: String,
    id: ActuatorId,
    world: Weak<Mutex<Box<dyn World>>>,
}

impl Actuator {
    pub(crate) fn new(name: String, id: ActuatorId, world: &SharedWorld) -> Self {
        Self {
            name,
            id,
            world: Arc::downgrade(world),
        }
    }

    /// The joint name this accessor was issued for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Commands an effort (torque or force) for the next tick.
    pub fn set_torque(&self, torque: f64) -> Result<(), SessionError> {
        if !torque.is_finite() {
            return Err(SessionError::InvalidArgument {
                reason: format!("torque must be finite, got {torque}"),
            });
        }
        with_weak(&self.world, |w| {
            w.set_actuator_effort(self.id, torque)
                .map_err(SessionError::Engine)
        })
    }

    /// Last commanded effort since the last reset.
    pub fn torque(&self) -> Result<f64, SessionError> {
        self.read(|s| s.effort)
    }

    /// Joint velocity.
    pub fn velocity(&self) -> Result<f64, SessionError> {
        self.read(|s| s.velocity)
    }

    /// Joint position.
    pub fn position(&self) -> Result<f64, SessionError> {
        self.read(|s| s.position)
    }

    fn read(&self, pick: impl FnOnce(&ActuatorState) -> f64) -> Result<f64, SessionError> {
        with_weak(&self.world, |w| {
            w.actuator_state(self.id)
                .map(|s| pick(&s))
                .map_err(SessionError::Engine)
        })
    }
}
