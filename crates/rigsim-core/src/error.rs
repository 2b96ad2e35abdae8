//! Errors reported by physics engine backends.

use std::error::Error;
use std::fmt;

use crate::id::{ActuatorId, BodyId, ModelId};

/// Errors from a physics engine backend or one of its worlds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// Process-wide engine setup failed.
    SetupFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// An operation requiring a set-up engine was called before setup.
    NotSetUp,
    /// A world file could not be located or parsed.
    WorldLoadFailed {
        /// The world path as requested.
        path: String,
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A model description was rejected.
    InvalidModel {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// `begin_update` was called while an update was already open.
    UpdateInProgress,
    /// `end_update` was called without a matching `begin_update`.
    NoUpdateInProgress,
    /// The model id is not known to this world.
    UnknownModel(ModelId),
    /// The body id is not known to this world.
    UnknownBody(BodyId),
    /// The actuator id is not known to this world.
    UnknownActuator(ActuatorId),
    /// Process-wide engine shutdown failed.
    ShutdownFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The world hit an unrecoverable numeric or internal fault.
    Faulted {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetupFailed { reason } => write!(f, "engine setup failed: {reason}"),
            Self::NotSetUp => write!(f, "engine is not set up"),
            Self::WorldLoadFailed { path, reason } => {
                write!(f, "failed to load world '{path}': {reason}")
            }
            Self::InvalidModel { reason } => write!(f, "invalid model: {reason}"),
            Self::UpdateInProgress => write!(f, "an update is already in progress"),
            Self::NoUpdateInProgress => write!(f, "no update is in progress"),
            Self::UnknownModel(id) => write!(f, "unknown {id}"),
            Self::UnknownBody(id) => write!(f, "unknown {id}"),
            Self::UnknownActuator(id) => write!(f, "unknown {id}"),
            Self::ShutdownFailed { reason } => write!(f, "engine shutdown failed: {reason}"),
            Self::Faulted { reason } => write!(f, "world faulted: {reason}"),
        }
    }
}

impl Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_entity() {
        assert_eq!(EngineError::UnknownBody(BodyId(3)).to_string(), "unknown body#3");
        let e = EngineError::WorldLoadFailed {
            path: "worlds/x.world".into(),
            reason: "not found".into(),
        };
        assert_eq!(e.to_string(), "failed to load world 'worlds/x.world': not found");
    }
}
