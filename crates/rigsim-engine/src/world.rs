//! One loaded simulation scene.

use nalgebra::Vector3;
use rigsim_core::{ActuatorId, BodyId, EngineError, ModelId, Pose, SimTimestamp};

use crate::physics::Physics;

/// Clock state reported at the boundaries of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateInfo {
    /// Simulated time of the tick being updated.
    pub sim_time: SimTimestamp,
    /// Number of ticks since the last reset, including this one.
    pub iteration: u64,
}

/// Kinematic state of a body, all in the world frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    /// Body frame relative to the world.
    pub pose: Pose,
    /// Linear velocity of the body frame origin.
    pub linear_velocity: Vector3<f64>,
    /// Angular velocity.
    pub angular_velocity: Vector3<f64>,
    /// Linear acceleration of the body frame origin.
    pub linear_acceleration: Vector3<f64>,
    /// Angular acceleration.
    pub angular_acceleration: Vector3<f64>,
}

/// Scalar state of an actuator's controlled axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActuatorState {
    /// Joint position (radians or metres).
    pub position: f64,
    /// Joint velocity.
    pub velocity: f64,
    /// Last commanded effort since the last reset.
    pub effort: f64,
}

/// A loaded scene that can be stepped, reset and queried.
///
/// One tick is bracketed by [`begin_update`](World::begin_update) and
/// [`end_update`](World::end_update). The clock advances in `begin_update`,
/// so both calls report the time of the tick being computed. Dynamics are
/// integrated in `end_update`. Between the two the world
/// [`is_running`](World::is_running).
pub trait World: Send {
    /// Declared world name.
    fn name(&self) -> &str;

    /// Queues an SDF model for insertion.
    ///
    /// The text is validated immediately. The model may only become
    /// visible to [`model_by_name`](World::model_by_name) after one or more
    /// ticks.
    fn insert_model_string(&mut self, sdf: &str) -> Result<(), EngineError>;

    /// Opens a tick: advances the clock and returns the new time.
    fn begin_update(&mut self) -> Result<UpdateInfo, EngineError>;

    /// Closes the tick opened by `begin_update`, integrating dynamics.
    fn end_update(&mut self) -> Result<UpdateInfo, EngineError>;

    /// Runs `ticks` complete ticks.
    fn run(&mut self, ticks: u64) -> Result<(), EngineError> {
        for _ in 0..ticks {
            self.begin_update()?;
            self.end_update()?;
        }
        Ok(())
    }

    /// True between `begin_update` and `end_update`.
    fn is_running(&self) -> bool;

    /// Current simulated time.
    fn sim_time(&self) -> SimTimestamp;

    /// Ticks completed since the last reset.
    fn iterations(&self) -> u64;

    /// Restores the clock to zero and every model to its initial pose with
    /// zero velocity and no applied effort.
    fn reset(&mut self) -> Result<(), EngineError>;

    /// Re-seeds the world's random number generator.
    fn reseed(&mut self, seed: u64);

    /// Physics settings.
    fn physics(&self) -> &dyn Physics;

    /// Mutable physics settings.
    fn physics_mut(&mut self) -> &mut dyn Physics;

    /// Looks up a materialized model.
    fn model_by_name(&self, name: &str) -> Option<ModelId>;

    /// Looks up a body of a model.
    fn body_by_name(&self, model: ModelId, name: &str) -> Option<BodyId>;

    /// Looks up an actuator of a model.
    fn actuator_by_name(&self, model: ModelId, name: &str) -> Option<ActuatorId>;

    /// Body names of a model, in declaration order.
    fn body_names(&self, model: ModelId) -> Result<Vec<String>, EngineError>;

    /// Actuator names of a model, in declaration order.
    fn actuator_names(&self, model: ModelId) -> Result<Vec<String>, EngineError>;

    /// Sets the pose a model returns to on [`reset`](World::reset).
    fn set_model_initial_pose(&mut self, model: ModelId, pose: Pose) -> Result<(), EngineError>;

    /// Moves a model's frame to `pose` in the world.
    fn set_model_pose(&mut self, model: ModelId, pose: Pose) -> Result<(), EngineError>;

    /// Reads a body's kinematic state.
    fn body_state(&self, body: BodyId) -> Result<BodyState, EngineError>;

    /// Reads an actuator's state.
    fn actuator_state(&self, actuator: ActuatorId) -> Result<ActuatorState, EngineError>;

    /// Commands an effort (torque or force) for the next tick.
    fn set_actuator_effort(&mut self, actuator: ActuatorId, effort: f64)
        -> Result<(), EngineError>;
}
