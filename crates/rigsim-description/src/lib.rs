//! Model description handling for rigsim.
//!
//! Two XML dialects are understood:
//!
//! - **SDF**, the native dialect: [`parse_model`] and [`parse_world`] turn
//!   SDF text into [`ModelDescription`] / [`WorldDescription`] values, and
//!   [`extract_model_name`] pulls the declared model name out of a
//!   document without interpreting the rest.
//! - **URDF**, the legacy dialect: [`parse_urdf`] reads a robot tree and
//!   [`convert_legacy_description`] rewrites it as SDF text.
//!
//! Everything here is a pure text transform. Nothing touches an engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod convert;
pub mod error;
pub mod name;
pub mod sdf;
pub mod urdf;
pub mod xml;

pub use convert::convert_legacy_description;
pub use error::DescriptionError;
pub use name::extract_model_name;
pub use sdf::{
    parse_model, parse_world, IncludeDescription, InertialDescription, JointAxisDescription,
    JointDescription, JointKind, LinkDescription, ModelDescription, PhysicsDescription,
    WorldDescription,
};
pub use urdf::{parse_urdf, UrdfJoint, UrdfJointKind, UrdfLink, UrdfRobot};
