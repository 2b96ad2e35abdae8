//! Physics settings of a reference world.

use std::time::Duration;

use rigsim_description::PhysicsDescription;

use crate::physics::Physics;

/// Physics settings of a [`ReferenceWorld`](super::ReferenceWorld).
#[derive(Clone, Debug, PartialEq)]
pub struct ReferencePhysics {
    kind: String,
    step_size: Duration,
    real_time_update_rate: f64,
    default_update_rate: f64,
    enabled: bool,
    quiet: bool,
}

impl ReferencePhysics {
    pub(crate) fn from_description(
        desc: &PhysicsDescription,
        quiet: bool,
    ) -> Result<Self, String> {
        let nanos = (desc.max_step_size * 1e9).round();
        if !(nanos >= 1.0 && nanos < u64::MAX as f64) {
            return Err(format!(
                "max_step_size {} is out of range",
                desc.max_step_size
            ));
        }
        let rate = desc.real_time_update_rate.max(0.0);
        Ok(Self {
            kind: desc.kind.clone(),
            step_size: Duration::from_nanos(nanos as u64),
            real_time_update_rate: rate,
            default_update_rate: rate,
            enabled: true,
            quiet,
        })
    }

    /// Whether diagnostics are silenced.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// The update rate declared by the world file.
    pub fn default_update_rate(&self) -> f64 {
        self.default_update_rate
    }

    pub(crate) fn restore_default_rate(&mut self) {
        self.real_time_update_rate = self.default_update_rate;
    }
}

impl Physics for ReferencePhysics {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn step_size(&self) -> Duration {
        self.step_size
    }

    fn real_time_update_rate(&self) -> f64 {
        self.real_time_update_rate
    }

    fn set_real_time_update_rate(&mut self, rate: f64) {
        if rate >= 0.0 {
            self.real_time_update_rate = rate;
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn suppress_diagnostics(&mut self) -> bool {
        self.quiet = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millisecond_step_is_exact() {
        let p = ReferencePhysics::from_description(&PhysicsDescription::default(), false).unwrap();
        assert_eq!(p.step_size(), Duration::from_millis(1));
        assert_eq!(p.real_time_update_rate(), 1000.0);
        assert_eq!(p.kind(), "ode");
    }

    #[test]
    fn negative_rate_override_is_ignored() {
        let mut p =
            ReferencePhysics::from_description(&PhysicsDescription::default(), false).unwrap();
        p.set_real_time_update_rate(-1.0);
        assert_eq!(p.real_time_update_rate(), 1000.0);
        p.set_real_time_update_rate(0.0);
        assert_eq!(p.real_time_update_rate(), 0.0);
        p.restore_default_rate();
        assert_eq!(p.real_time_update_rate(), 1000.0);
    }

    #[test]
    fn sub_nanosecond_step_is_rejected() {
        let desc = PhysicsDescription {
            max_step_size: 1e-12,
            ..PhysicsDescription::default()
        };
        assert!(ReferencePhysics::from_description(&desc, false).is_err());
    }

    #[test]
    fn suppression_is_supported() {
        let mut p =
            ReferencePhysics::from_description(&PhysicsDescription::default(), false).unwrap();
        assert!(!p.is_quiet());
        assert!(p.suppress_diagnostics());
        assert!(p.is_quiet());
    }
}
