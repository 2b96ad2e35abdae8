//! Simulation session lifecycle for rigsim.
//!
//! A [`Session`] owns one physics engine, one loaded world and one model
//! inserted into it. It enforces a strict lifecycle around the engine
//! (one live session per process), waits for the inserted model to become
//! queryable, and offers deterministic stepping and reset:
//!
//! - [`Session::start`] brings everything up from a [`SessionConfig`].
//! - [`Session::step`] and [`Session::run_for`] advance the simulation,
//!   the latter with per-tick [`UpdateHooks`].
//! - [`Session::reset`] restores the configured pose and seed.
//! - [`Session::body`] and [`Session::actuator`] hand out non-owning
//!   [`Body`] and [`Actuator`] accessors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod accessor;
pub mod config;
pub mod error;
pub mod hooks;
mod lease;
pub mod session;

pub use accessor::{Actuator, Body};
pub use config::{
    AvailabilityPolicy, ConfigError, SessionConfig, AS_FAST_AS_POSSIBLE, DEFAULT_POLL_ATTEMPTS,
    DEFAULT_POLL_INTERVAL, DEFAULT_SEED, WORLD_DEFAULT_RATE,
};
pub use error::{AccessorKind, SessionError};
pub use hooks::UpdateHooks;
pub use lease::engine_in_use;
pub use session::{Session, SessionState};
