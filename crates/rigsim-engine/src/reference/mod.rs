//! Deterministic reference backend.
//!
//! [`ReferenceEngine`] loads SDF worlds and produces [`ReferenceWorld`]s.
//! Each world advances a fixed-step clock and integrates, per tick:
//!
//! 1. the floating base of every non-anchored model under gravity, stopped
//!    at `z = 0` by a ground plane if the world includes one;
//! 2. every revolute and prismatic joint independently, driven by the
//!    commanded effort plus optional Gaussian effort noise, gravity load,
//!    viscous damping and Coulomb friction, and bounded by effort, velocity
//!    and position limits;
//! 3. forward kinematics for all link poses, with link velocities and
//!    accelerations from finite differences.
//!
//! Identical seeds, identical inputs and identical call sequences give
//! bit-identical trajectories. The backend holds no process-global state.

mod engine;
mod model;
mod noise;
mod pacer;
mod physics;
mod world;

pub use engine::{ReferenceEngine, BUILTIN_EMPTY_WORLD};
pub use physics::ReferencePhysics;
pub use world::ReferenceWorld;
