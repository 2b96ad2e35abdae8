//! Core types for the rigsim simulation session.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by every other crate in the workspace: simulated
//! timestamps, poses and roll-pitch-yaw/DCM conversion, opaque entity ids,
//! and the error type reported by physics engine backends.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod frame;
pub mod id;
pub mod time;

pub use error::EngineError;
pub use frame::{dcm_to_euler_angles, euler_angles_to_dcm, Pose};
pub use id::{ActuatorId, BodyId, ModelId};
pub use time::SimTimestamp;
