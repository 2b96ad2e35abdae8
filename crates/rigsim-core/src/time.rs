//! Simulated time.

use std::fmt;
use std::time::Duration;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A point on the simulation clock, measured from the last reset.
///
/// Stored as whole seconds plus a nanosecond remainder so that repeated
/// fixed-size steps accumulate exactly. The remainder is always
/// normalized to `< 1_000_000_000`, which makes the derived ordering a
/// total order on elapsed time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTimestamp {
    secs: u64,
    nanos: u32,
}

impl SimTimestamp {
    /// The start of simulated time.
    pub const ZERO: SimTimestamp = SimTimestamp { secs: 0, nanos: 0 };

    /// Creates a timestamp, carrying excess nanoseconds into seconds.
    pub fn new(secs: u64, nanos: u32) -> Self {
        let carry = u64::from(nanos) / NANOS_PER_SEC;
        Self {
            secs: secs.saturating_add(carry),
            nanos: (u64::from(nanos) % NANOS_PER_SEC) as u32,
        }
    }

    /// Creates a timestamp from a total nanosecond count.
    pub fn from_nanos(nanos: u64) -> Self {
        Self {
            secs: nanos / NANOS_PER_SEC,
            nanos: (nanos % NANOS_PER_SEC) as u32,
        }
    }

    /// Creates a timestamp from an elapsed duration.
    pub fn from_duration(d: Duration) -> Self {
        Self {
            secs: d.as_secs(),
            nanos: d.subsec_nanos(),
        }
    }

    /// Whole seconds component.
    pub fn secs(&self) -> u64 {
        self.secs
    }

    /// Nanosecond remainder, always `< 1_000_000_000`.
    pub fn subsec_nanos(&self) -> u32 {
        self.nanos
    }

    /// Elapsed time as a [`Duration`].
    pub fn as_duration(&self) -> Duration {
        Duration::new(self.secs, self.nanos)
    }

    /// Elapsed time in seconds as a float.
    pub fn as_secs_f64(&self) -> f64 {
        self.secs as f64 + f64::from(self.nanos) * 1e-9
    }

    /// Total elapsed nanoseconds.
    pub fn as_nanos(&self) -> u128 {
        u128::from(self.secs) * u128::from(NANOS_PER_SEC) + u128::from(self.nanos)
    }

    /// Adds a duration, returning `None` on overflow.
    pub fn checked_add(&self, d: Duration) -> Option<SimTimestamp> {
        self.as_duration()
            .checked_add(d)
            .map(SimTimestamp::from_duration)
    }
}

impl From<Duration> for SimTimestamp {
    fn from(d: Duration) -> Self {
        Self::from_duration(d)
    }
}

impl From<SimTimestamp> for Duration {
    fn from(t: SimTimestamp) -> Self {
        t.as_duration()
    }
}

impl fmt::Display for SimTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}s", self.secs, self.nanos)
    }
}
