//! Wall-clock pacing for a target real-time update rate.

use std::thread;
use std::time::{Duration, Instant};

/// Sleeps between ticks so that at most `rate` ticks run per wall-clock
/// second.
#[derive(Debug, Default)]
pub(crate) struct RealTimePacer {
    next_deadline: Option<Instant>,
}

impl RealTimePacer {
    /// Blocks until the next tick is due. A rate of zero (or one whose
    /// period is not representable) disables pacing.
    pub(crate) fn pace(&mut self, rate: f64) {
        let Some(period) = period(rate) else {
            self.next_deadline = None;
            return;
        };
        let now = Instant::now();
        if let Some(deadline) = self.next_deadline {
            if deadline > now {
                thread::sleep(deadline - now);
            }
        }
        let base = self.next_deadline.map_or(now, |d| d.max(now));
        self.next_deadline = Some(base + period);
    }

    pub(crate) fn reset(&mut self) {
        self.next_deadline = None;
    }
}

fn period(rate: f64) -> Option<Duration> {
    if !(rate > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / rate).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_never_sleeps() {
        let mut pacer = RealTimePacer::default();
        let start = Instant::now();
        for _ in 0..1000 {
            pacer.pace(0.0);
        }
        assert!(start.elapsed() < Duration::from_millis(500));
        assert!(pacer.next_deadline.is_none());
    }

    #[test]
    fn positive_rate_spaces_ticks() {
        let mut pacer = RealTimePacer::default();
        let start = Instant::now();
        for _ in 0..5 {
            pacer.pace(200.0);
        }
        // The first tick is free; four more periods of 5 ms follow.
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn degenerate_rates_disable_pacing() {
        assert!(period(f64::NAN).is_none());
        assert!(period(-1.0).is_none());
        assert!(period(f64::MIN_POSITIVE).is_none());
        assert_eq!(period(1000.0), Some(Duration::from_millis(1)));
    }
}
