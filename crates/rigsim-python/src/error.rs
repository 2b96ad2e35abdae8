//! SessionError -> Python exception mapping with recovery hints.

use pyo3::exceptions::{PyLookupError, PyRuntimeError, PyTimeoutError, PyValueError};
use pyo3::PyErr;

use rigsim_description::DescriptionError;
use rigsim_session::SessionError;

/// Python exception class a native error is raised as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Exception {
    Value,
    Runtime,
    Timeout,
    Lookup,
}

/// Returns the exception class and a recovery hint for each error.
fn classify(err: &SessionError) -> (Exception, &'static str) {
    match err {
        // Caller-fixable inputs → ValueError
        SessionError::Configuration(_) => (
            Exception::Value,
            "Fix the SessionConfig field named above; config.validate() \
             reports the same problem without starting the engine.",
        ),
        SessionError::Resolution(_) => (
            Exception::Value,
            "model_description must be SDF text with a <model name=...> \
             element. Convert URDF first with urdf_to_sdf().",
        ),
        SessionError::InvalidArgument { .. } => (
            Exception::Value,
            "Check the argument ranges: run_for needs num_steps >= 1 and an \
             on_begin callable; torques must be finite.",
        ),

        SessionError::AvailabilityTimeout { .. } => (
            Exception::Timeout,
            "The inserted model never appeared in the world. Raise \
             config.poll_attempts, or check that the model name in the \
             description is unique within the world.",
        ),

        SessionError::Lookup { .. } => (
            Exception::Lookup,
            "Use session.body_names() / session.actuator_names() to list \
             what the model declares.",
        ),

        SessionError::Conflict => (
            Exception::Runtime,
            "Only one session may hold the physics engine per process. \
             Call shutdown() on the other session first.",
        ),
        SessionError::NotReady { .. } => (
            Exception::Runtime,
            "Call start() first. A session that was shut down cannot be \
             restarted; create a new one.",
        ),
        SessionError::Invalidated => (
            Exception::Runtime,
            "Body and Actuator objects die with their session. Fetch new \
             ones after starting a new session.",
        ),
        SessionError::EngineBringup(_) => (
            Exception::Runtime,
            "Check world_path, media_paths and model_paths. Set \
             config.verbose = True for engine diagnostics.",
        ),
        SessionError::Engine(_) => (
            Exception::Runtime,
            "The world faulted while stepping. Call reset() to recover.",
        ),
    }
}

/// Converts a session failure into a typed Python exception.
pub(crate) fn session_err(err: SessionError) -> PyErr {
    let (exception, hint) = classify(&err);
    let msg = format!("{err}\n  Hint: {hint}");
    match exception {
        Exception::Value => PyValueError::new_err(msg),
        Exception::Runtime => PyRuntimeError::new_err(msg),
        Exception::Timeout => PyTimeoutError::new_err(msg),
        Exception::Lookup => PyLookupError::new_err(msg),
    }
}

/// Model description failures are always the caller's input → ValueError.
pub(crate) fn description_err(err: DescriptionError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Raised when a session method is re-entered from one of its own
/// `run_for` callbacks.
pub(crate) fn busy_err() -> PyErr {
    PyRuntimeError::new_err(
        "session is busy running\n  Hint: inside run_for callbacks use Body \
         and Actuator objects fetched beforehand, not the Session itself.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigsim_core::EngineError;
    use rigsim_session::{AccessorKind, ConfigError};

    fn all_variants() -> Vec<SessionError> {
        vec![
            SessionError::Configuration(ConfigError::EmptyWorldPath),
            SessionError::Conflict,
            SessionError::Resolution(DescriptionError::NoRootLink),
            SessionError::EngineBringup(EngineError::NotSetUp),
            SessionError::AvailabilityTimeout {
                model: "m".into(),
                attempts: 3,
            },
            SessionError::NotReady { reason: "r".into() },
            SessionError::InvalidArgument { reason: "r".into() },
            SessionError::Lookup {
                kind: AccessorKind::Body,
                name: "n".into(),
            },
            SessionError::Invalidated,
            SessionError::Engine(EngineError::UpdateInProgress),
        ]
    }

    #[test]
    fn every_error_has_a_hint() {
        for err in all_variants() {
            let (_, hint) = classify(&err);
            assert!(!hint.is_empty(), "{err:?} has empty hint");
        }
    }

    #[test]
    fn lookups_and_timeouts_get_their_own_exceptions() {
        let kinds: Vec<_> = all_variants().iter().map(|e| classify(e).0).collect();
        assert_eq!(kinds.iter().filter(|k| **k == Exception::Lookup).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == Exception::Timeout).count(), 1);
        assert_eq!(classify(&SessionError::Conflict).0, Exception::Runtime);
        assert_eq!(
            classify(&SessionError::Configuration(ConfigError::NoPollAttempts)).0,
            Exception::Value
        );
    }
}
