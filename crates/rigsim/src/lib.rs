//! Rigsim: deterministic robot simulation sessions for reinforcement learning.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! rigsim sub-crates. For most users, adding `rigsim` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use rigsim::prelude::*;
//!
//! let config = SessionConfig {
//!     model_description: r#"<sdf version="1.6"><model name="box">
//!         <link name="base"/><link name="lid"/>
//!         <joint name="hinge" type="revolute">
//!           <parent>base</parent><child>lid</child>
//!         </joint>
//!       </model></sdf>"#
//!         .to_string(),
//!     real_time_update_rate: AS_FAST_AS_POSSIBLE,
//!     ..SessionConfig::default()
//! };
//! let mut session = Session::new(config);
//! session.start().unwrap();
//!
//! let hinge = session.actuator("hinge").unwrap();
//! session
//!     .run_for(10, UpdateHooks::new().on_begin(|_| hinge.set_torque(0.5).unwrap()))
//!     .unwrap();
//! assert_eq!(
//!     session.simulation_time(),
//!     SimTimestamp::from(std::time::Duration::from_millis(10))
//! );
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rigsim-core` | Timestamps, poses, ids, engine errors |
//! | [`description`] | `rigsim-description` | SDF parsing, URDF conversion |
//! | [`engine`] | `rigsim-engine` | Engine traits and the reference backend |
//! | [`session`] | `rigsim-session` | Session lifecycle and accessors |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`rigsim-core`).
///
/// Contains [`types::SimTimestamp`], [`types::Pose`], the roll-pitch-yaw
/// conversions and the [`types::EngineError`] reported by backends.
pub use rigsim_core as types;

/// Model descriptions (`rigsim-description`).
///
/// SDF parsing, [`description::extract_model_name`] and the URDF to SDF
/// converter [`description::convert_legacy_description`].
pub use rigsim_description as description;

/// Physics engine abstraction (`rigsim-engine`).
///
/// The [`engine::Engine`], [`engine::World`] and [`engine::Physics`] traits
/// and the deterministic [`engine::ReferenceEngine`].
pub use rigsim_engine as engine;

/// Simulation sessions (`rigsim-session`).
pub use rigsim_session as session;

/// Common imports for typical rigsim usage.
///
/// ```rust
/// use rigsim::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use rigsim_core::{dcm_to_euler_angles, euler_angles_to_dcm, Pose, SimTimestamp};

    // Descriptions
    pub use rigsim_description::{convert_legacy_description, extract_model_name};

    // Errors
    pub use rigsim_core::EngineError;
    pub use rigsim_description::DescriptionError;
    pub use rigsim_session::{ConfigError, SessionError};

    // Engine
    pub use rigsim_engine::{Engine, ReferenceEngine, UpdateInfo};

    // Session
    pub use rigsim_session::{
        Actuator, AvailabilityPolicy, Body, Session, SessionConfig, SessionState, UpdateHooks,
        AS_FAST_AS_POSSIBLE, WORLD_DEFAULT_RATE,
    };
}
