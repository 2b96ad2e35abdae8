//! Physics backend settings.

use std::time::Duration;

/// The tunable settings of a world's physics backend.
pub trait Physics: Send {
    /// Backend type, e.g. `ode`.
    fn kind(&self) -> &str;

    /// Simulated duration of one tick.
    fn step_size(&self) -> Duration;

    /// Target ticks per wall-clock second. `0.0` runs as fast as possible.
    fn real_time_update_rate(&self) -> f64;

    /// Sets the target ticks per wall-clock second. Negative values are
    /// ignored.
    fn set_real_time_update_rate(&mut self, rate: f64);

    /// Whether dynamics are integrated on each tick. The clock advances
    /// either way.
    fn is_enabled(&self) -> bool;

    /// Enables or disables dynamics integration.
    fn set_enabled(&mut self, enabled: bool);

    /// Silences the backend's own diagnostic output.
    ///
    /// Returns `false` if the backend has no such capability, which is the
    /// default.
    fn suppress_diagnostics(&mut self) -> bool {
        false
    }
}
