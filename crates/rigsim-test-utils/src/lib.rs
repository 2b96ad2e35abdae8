//! Test utilities, fixtures and mock types for rigsim development.
//!
//! - [`fixtures`]: the differential-drive model and the 1 ms test world.
//! - [`MockEngine`]: an [`Engine`](rigsim_engine::Engine) whose bring-up
//!   can be made to fail at a chosen stage, with call counters.
//! - [`serial`]: a process-wide lock for tests that start sessions, since
//!   only one session may hold the engine per process.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
mod mock;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use mock::{MockEngine, MockFailure, MockStats, MockWorld};

static SERIAL: Mutex<()> = Mutex::new(());

/// Serializes tests that start sessions within one test binary.
///
/// A panicking test does not poison the lock for the others.
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}
