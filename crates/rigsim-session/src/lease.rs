//! Process-wide engine exclusivity.

use std::sync::atomic::{AtomicBool, Ordering};

static ENGINE_IN_USE: AtomicBool = AtomicBool::new(false);

/// Exclusive right to drive the physics engine in this process.
///
/// Released on drop.
#[derive(Debug)]
pub(crate) struct EngineLease {
    _private: (),
}

impl EngineLease {
    /// Acquires the lease, or returns `None` if it is already held.
    pub(crate) fn acquire() -> Option<Self> {
        ENGINE_IN_USE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { _private: () })
    }
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        ENGINE_IN_USE.store(false, Ordering::Release);
    }
}

/// Whether a session currently holds the engine in this process.
pub fn engine_in_use() -> bool {
    ENGINE_IN_USE.load(Ordering::Acquire)
}
