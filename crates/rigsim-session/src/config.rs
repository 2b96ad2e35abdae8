//! Session configuration, validation, and error types.
//!
//! [`SessionConfig`] is plain data with public fields and a [`Default`].
//! [`validate()`](SessionConfig::validate) runs before any engine
//! interaction, so a bad config never touches the engine.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use nalgebra::Vector3;
use rigsim_core::Pose;
use rigsim_engine::EngineOptions;
use rigsim_engine::reference::BUILTIN_EMPTY_WORLD;

/// Update-rate override meaning "step as fast as possible".
pub const AS_FAST_AS_POSSIBLE: f64 = 0.0;

/// Update-rate override meaning "keep the world file's rate".
pub const WORLD_DEFAULT_RATE: f64 = -1.0;

/// Default seed for the world's noise generator.
pub const DEFAULT_SEED: u64 = 918_273_645;

/// Default number of ticks spent waiting for the inserted model.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 500;

/// Default wall-clock pause between availability polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

// ── AvailabilityPolicy ─────────────────────────────────────────────

/// How long [`Session::start`](crate::Session::start) waits for the
/// inserted model to become queryable.
///
/// Each attempt advances the world one tick and looks the model up; the
/// interval is slept only between failed attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AvailabilityPolicy {
    /// Maximum number of poll attempts. Default: 500. Minimum: 1.
    pub attempts: u32,
    /// Pause after each failed attempt. Default: 10 ms.
    pub interval: Duration,
}

impl Default for AvailabilityPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SessionConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `world_path` is empty.
    EmptyWorldPath,
    /// `model_description` is empty.
    EmptyModelDescription,
    /// A media or model search path entry is empty.
    EmptySearchPath {
        /// Which list the entry belongs to.
        list: &'static str,
        /// Position of the entry in that list.
        index: usize,
    },
    /// `real_time_update_rate` is NaN.
    InvalidUpdateRate {
        /// The invalid value.
        value: f64,
    },
    /// A pose component is NaN or infinite.
    NonFiniteInitialPose,
    /// `availability.attempts` is zero.
    NoPollAttempts,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyWorldPath => write!(f, "world path must not be empty"),
            Self::EmptyModelDescription => write!(f, "model description must not be empty"),
            Self::EmptySearchPath { list, index } => {
                write!(f, "{list} entry {index} is empty")
            }
            Self::InvalidUpdateRate { value } => {
                write!(f, "real_time_update_rate must be a number, got {value}")
            }
            Self::NonFiniteInitialPose => {
                write!(f, "initial position and orientation must be finite")
            }
            Self::NoPollAttempts => write!(f, "availability attempts must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

// ── SessionConfig ──────────────────────────────────────────────────

/// Complete configuration for a [`Session`](crate::Session).
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// World file, resolved against `media_paths`.
    /// Default: `worlds/empty.world`.
    pub world_path: String,
    /// Native SDF text of the model to insert.
    pub model_description: String,
    /// Model position in the world frame. Default: origin.
    pub initial_position: Vector3<f64>,
    /// Model orientation as roll, pitch, yaw in radians. Default: zero.
    pub initial_orientation: Vector3<f64>,
    /// Forward engine diagnostics. Default: false.
    pub verbose: bool,
    /// Seed applied to the world's noise generator on every reset.
    /// Default: 918273645.
    pub seed: u64,
    /// Whether dynamics are integrated. Default: true.
    pub enable_physics: bool,
    /// Real-time update rate override in ticks per wall-clock second.
    /// `0` steps as fast as possible; negative keeps the world file's rate.
    /// Default: [`AS_FAST_AS_POSSIBLE`].
    pub real_time_update_rate: f64,
    /// Directories searched for world files and media.
    pub media_paths: Vec<PathBuf>,
    /// Directories searched for `model://` includes.
    pub model_paths: Vec<PathBuf>,
    /// Model availability polling.
    pub availability: AvailabilityPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            world_path: BUILTIN_EMPTY_WORLD.to_string(),
            model_description: String::new(),
            initial_position: Vector3::zeros(),
            initial_orientation: Vector3::zeros(),
            verbose: false,
            seed: DEFAULT_SEED,
            enable_physics: true,
            real_time_update_rate: AS_FAST_AS_POSSIBLE,
            media_paths: Vec::new(),
            model_paths: Vec::new(),
            availability: AvailabilityPolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_path.is_empty() {
            return Err(ConfigError::EmptyWorldPath);
        }
        if self.model_description.is_empty() {
            return Err(ConfigError::EmptyModelDescription);
        }
        for (list, paths) in [
            ("media_paths", &self.media_paths),
            ("model_paths", &self.model_paths),
        ] {
            if let Some(index) = paths.iter().position(|p| p.as_os_str().is_empty()) {
                return Err(ConfigError::EmptySearchPath { list, index });
            }
        }
        if self.real_time_update_rate.is_nan() {
            return Err(ConfigError::InvalidUpdateRate {
                value: self.real_time_update_rate,
            });
        }
        let finite = |v: &Vector3<f64>| v.iter().all(|c| c.is_finite());
        if !finite(&self.initial_position) || !finite(&self.initial_orientation) {
            return Err(ConfigError::NonFiniteInitialPose);
        }
        if self.availability.attempts == 0 {
            return Err(ConfigError::NoPollAttempts);
        }
        Ok(())
    }

    /// The configured initial pose of the model.
    pub fn initial_pose(&self) -> Pose {
        Pose::from_position_rpy(self.initial_position, self.initial_orientation)
    }

    pub(crate) fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            verbose: self.verbose,
            media_paths: self.media_paths.clone(),
            model_paths: self.model_paths.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SessionConfig {
        SessionConfig {
            model_description: "<sdf><model name=\"m\"/></sdf>".to_string(),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn defaults() {
        let c = SessionConfig::default();
        assert_eq!(c.world_path, "worlds/empty.world");
        assert_eq!(c.seed, 918273645);
        assert!(c.enable_physics);
        assert!(!c.verbose);
        assert_eq!(c.real_time_update_rate, AS_FAST_AS_POSSIBLE);
        assert_eq!(c.availability.attempts, 500);
        assert_eq!(c.availability.interval, Duration::from_millis(10));
    }

    #[test]
    fn default_config_needs_a_model() {
        assert_eq!(
            SessionConfig::default().validate(),
            Err(ConfigError::EmptyModelDescription)
        );
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn whitespace_model_description_is_left_to_resolution() {
        let c = SessionConfig {
            model_description: " \n\t".to_string(),
            ..valid()
        };
        assert_eq!(c.validate(), Ok(()));
    }

    #[test]
    fn empty_world_path_rejected() {
        let c = SessionConfig {
            world_path: String::new(),
            ..valid()
        };
        assert_eq!(c.validate(), Err(ConfigError::EmptyWorldPath));
    }

    #[test]
    fn empty_search_path_entry_rejected() {
        let c = SessionConfig {
            model_paths: vec![PathBuf::from("/models"), PathBuf::new()],
            ..valid()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::EmptySearchPath {
                list: "model_paths",
                index: 1
            })
        );
    }

    #[test]
    fn nan_rate_rejected_negative_allowed() {
        let nan = SessionConfig {
            real_time_update_rate: f64::NAN,
            ..valid()
        };
        assert!(matches!(
            nan.validate(),
            Err(ConfigError::InvalidUpdateRate { .. })
        ));
        let negative = SessionConfig {
            real_time_update_rate: WORLD_DEFAULT_RATE,
            ..valid()
        };
        assert_eq!(negative.validate(), Ok(()));
    }

    #[test]
    fn zero_attempts_rejected() {
        let c = SessionConfig {
            availability: AvailabilityPolicy {
                attempts: 0,
                interval: Duration::ZERO,
            },
            ..valid()
        };
        assert_eq!(c.validate(), Err(ConfigError::NoPollAttempts));
    }

    #[test]
    fn non_finite_pose_rejected() {
        let c = SessionConfig {
            initial_orientation: Vector3::new(0.0, f64::INFINITY, 0.0),
            ..valid()
        };
        assert_eq!(c.validate(), Err(ConfigError::NonFiniteInitialPose));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn finite_pose_and_rate_validate(
                p in prop::array::uniform3(-1e3f64..1e3),
                rpy in prop::array::uniform3(-3.0f64..3.0),
                rate in -10.0f64..1e4,
            ) {
                let c = SessionConfig {
                    initial_position: Vector3::from(p),
                    initial_orientation: Vector3::from(rpy),
                    real_time_update_rate: rate,
                    ..valid()
                };
                prop_assert_eq!(c.validate(), Ok(()));
                prop_assert_eq!(c.initial_pose().position, Vector3::from(p));
            }
        }
    }
}
