//! Error types for the session layer.

use std::error::Error;
use std::fmt;

use rigsim_core::EngineError;
use rigsim_description::DescriptionError;

use crate::config::ConfigError;

/// Which kind of accessor a failed lookup asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessorKind {
    /// A [`Body`](crate::Body) (link).
    Body,
    /// An [`Actuator`](crate::Actuator) (joint).
    Actuator,
}

impl fmt::Display for AccessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body => write!(f, "body"),
            Self::Actuator => write!(f, "actuator"),
        }
    }
}

/// Errors returned by [`Session`](crate::Session) and its accessors.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionError {
    /// The configuration failed validation.
    Configuration(ConfigError),
    /// Another session already holds the process-wide engine.
    Conflict,
    /// The model name could not be read from the model description.
    Resolution(DescriptionError),
    /// Engine setup, world loading or model insertion failed.
    EngineBringup(EngineError),
    /// The inserted model never became queryable.
    AvailabilityTimeout {
        /// Name of the model that was waited for.
        model: String,
        /// Number of poll attempts made.
        attempts: u32,
    },
    /// The operation requires a started session.
    NotReady {
        /// What was attempted, and why it could not run.
        reason: String,
    },
    /// An argument was out of range or missing.
    InvalidArgument {
        /// Description of the problem.
        reason: String,
    },
    /// No body or actuator with this name exists in the model.
    Lookup {
        /// What was looked up.
        kind: AccessorKind,
        /// The name that did not resolve.
        name: String,
    },
    /// The accessor outlived the session that issued it.
    Invalidated,
    /// The engine failed while stepping or resetting.
    Engine(EngineError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(e) => write!(f, "invalid configuration: {e}"),
            Self::Conflict => write!(f, "a simulation session is already running in this process"),
            Self::Resolution(e) => write!(f, "cannot determine model name: {e}"),
            Self::EngineBringup(e) => write!(f, "engine bring-up failed: {e}"),
            Self::AvailabilityTimeout { model, attempts } => {
                write!(f, "model '{model}' not available after {attempts} attempts")
            }
            Self::NotReady { reason } => write!(f, "session not ready: {reason}"),
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::Lookup { kind, name } => write!(f, "no {kind} named '{name}'"),
            Self::Invalidated => write!(f, "accessor used after its session was shut down"),
            Self::Engine(e) => write!(f, "engine error: {e}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Configuration(e) => Some(e),
            Self::Resolution(e) => Some(e),
            Self::EngineBringup(e) | Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(e: ConfigError) -> Self {
        Self::Configuration(e)
    }
}

impl From<DescriptionError> for SessionError {
    fn from(e: DescriptionError) -> Self {
        Self::Resolution(e)
    }
}
