//! PySessionConfig: Python wrapper around `SessionConfig`.

use std::path::PathBuf;
use std::time::Duration;

use nalgebra::Vector3;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use rigsim_session::SessionConfig as Inner;

/// Configuration for a `Session`.
///
/// Every field is a read/write property initialized to its default.
/// `validate()` raises `ValueError` on the first invalid field.
#[pyclass(name = "SessionConfig")]
pub(crate) struct SessionConfig {
    pub(crate) inner: Inner,
}

#[pymethods]
impl SessionConfig {
    #[new]
    fn new() -> Self {
        SessionConfig {
            inner: Inner::default(),
        }
    }

    /// Check every field. Raises ValueError on the first problem.
    fn validate(&self) -> PyResult<()> {
        self.inner
            .validate()
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// World file, resolved against `media_paths`.
    #[getter]
    fn world_path(&self) -> &str {
        &self.inner.world_path
    }

    #[setter]
    fn set_world_path(&mut self, value: String) {
        self.inner.world_path = value;
    }

    /// SDF text of the model to insert.
    #[getter]
    fn model_description(&self) -> &str {
        &self.inner.model_description
    }

    #[setter]
    fn set_model_description(&mut self, value: String) {
        self.inner.model_description = value;
    }

    /// Initial model position `[x, y, z]` in the world frame.
    #[getter]
    fn initial_position(&self) -> [f64; 3] {
        self.inner.initial_position.into()
    }

    #[setter]
    fn set_initial_position(&mut self, value: [f64; 3]) {
        self.inner.initial_position = Vector3::from(value);
    }

    /// Initial model orientation `[roll, pitch, yaw]` in radians.
    #[getter]
    fn initial_orientation(&self) -> [f64; 3] {
        self.inner.initial_orientation.into()
    }

    #[setter]
    fn set_initial_orientation(&mut self, value: [f64; 3]) {
        self.inner.initial_orientation = Vector3::from(value);
    }

    /// Forward engine diagnostics.
    #[getter]
    fn verbose(&self) -> bool {
        self.inner.verbose
    }

    #[setter]
    fn set_verbose(&mut self, value: bool) {
        self.inner.verbose = value;
    }

    /// Noise seed re-applied on every reset.
    #[getter]
    fn seed(&self) -> u64 {
        self.inner.seed
    }

    #[setter]
    fn set_seed(&mut self, value: u64) {
        self.inner.seed = value;
    }

    /// Whether dynamics are integrated.
    #[getter]
    fn enable_physics(&self) -> bool {
        self.inner.enable_physics
    }

    #[setter]
    fn set_enable_physics(&mut self, value: bool) {
        self.inner.enable_physics = value;
    }

    /// Ticks per wall-clock second. 0 = as fast as possible, negative =
    /// keep the world file's rate.
    #[getter]
    fn real_time_update_rate(&self) -> f64 {
        self.inner.real_time_update_rate
    }

    #[setter]
    fn set_real_time_update_rate(&mut self, value: f64) {
        self.inner.real_time_update_rate = value;
    }

    /// Directories searched for world files.
    #[getter]
    fn media_paths(&self) -> Vec<PathBuf> {
        self.inner.media_paths.clone()
    }

    #[setter]
    fn set_media_paths(&mut self, value: Vec<PathBuf>) {
        self.inner.media_paths = value;
    }

    /// Directories searched for `model://` includes.
    #[getter]
    fn model_paths(&self) -> Vec<PathBuf> {
        self.inner.model_paths.clone()
    }

    #[setter]
    fn set_model_paths(&mut self, value: Vec<PathBuf>) {
        self.inner.model_paths = value;
    }

    /// Maximum ticks to wait for the inserted model to appear.
    #[getter]
    fn poll_attempts(&self) -> u32 {
        self.inner.availability.attempts
    }

    #[setter]
    fn set_poll_attempts(&mut self, value: u32) {
        self.inner.availability.attempts = value;
    }

    /// Wall-clock pause between availability polls.
    #[getter]
    fn poll_interval(&self) -> Duration {
        self.inner.availability.interval
    }

    #[setter]
    fn set_poll_interval(&mut self, value: Duration) {
        self.inner.availability.interval = value;
    }

    fn __repr__(&self) -> String {
        format!(
            "SessionConfig(world_path={:?}, seed={}, real_time_update_rate={})",
            self.inner.world_path, self.inner.seed, self.inner.real_time_update_rate
        )
    }
}
