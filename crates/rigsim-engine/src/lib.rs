//! Physics engine abstraction for rigsim.
//!
//! A session talks to its physics engine through three traits:
//!
//! - [`Engine`]: process-wide bring-up, world loading and teardown.
//! - [`World`]: one loaded scene. Stepping, reset and re-seeding, plus the
//!   body and actuator registry.
//! - [`Physics`]: the tunable settings of a world's physics backend.
//!
//! The [`reference`] module ships a deterministic backend implementing all
//! three. It integrates single-axis joint dynamics and forward kinematics
//! over SDF models, with a floating base that falls under gravity onto an
//! optional ground plane. It is not a general rigid-body solver: there is
//! no contact, collision or constraint solving beyond joint limits.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod physics;
pub mod reference;
pub mod world;

pub use engine::{Engine, EngineOptions};
pub use physics::Physics;
pub use reference::ReferenceEngine;
pub use world::{ActuatorState, BodyState, UpdateInfo, World};
