//! PySession: Python wrapper around the session lifecycle.
//!
//! `step` and `reset` release the GIL via `py.detach()`: with a non-zero
//! real-time update rate a tick sleeps to pace itself, and other Python
//! threads should run meanwhile. `run_for` keeps the GIL since it calls
//! back into Python every tick.

use std::cell::RefCell;
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::Duration;

use pyo3::prelude::*;

use rigsim_session::{Session as Inner, UpdateHooks};

use crate::accessor::{Actuator, Body};
use crate::config::SessionConfig;
use crate::error::{busy_err, session_err};

/// A simulation session: one engine, one world, one model.
///
/// Only one started session may exist per process. A session that was
/// shut down cannot be restarted.
#[pyclass(name = "Session")]
pub(crate) struct Session {
    inner: Mutex<Inner>,
}

impl Session {
    /// Locks the session. Fails instead of deadlocking when called from a
    /// `run_for` callback of the same session.
    fn lock(&self) -> PyResult<MutexGuard<'_, Inner>> {
        match self.inner.try_lock() {
            Ok(guard) => Ok(guard),
            Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => Err(busy_err()),
        }
    }
}

#[pymethods]
impl Session {
    /// Create an unstarted session from a copy of `config`.
    #[new]
    fn new(config: PyRef<'_, SessionConfig>) -> Self {
        Session {
            inner: Mutex::new(Inner::new(config.inner.clone())),
        }
    }

    /// Bring up the engine, load the world and insert the model.
    fn start(&self, py: Python<'_>) -> PyResult<()> {
        let mut guard = self.lock()?;
        let session: &mut Inner = &mut guard;
        py.detach(|| session.start()).map_err(session_err)
    }

    /// Advance the simulation by one tick.
    fn step(&self, py: Python<'_>) -> PyResult<()> {
        let mut guard = self.lock()?;
        let session: &mut Inner = &mut guard;
        py.detach(|| session.step()).map_err(session_err)
    }

    /// Advance by `num_steps` ticks, calling `on_begin(sim_time)` before and
    /// `on_end(sim_time)` after each tick's dynamics.
    ///
    /// All ticks run even if a callback raises; the first exception is
    /// re-raised afterwards.
    #[pyo3(signature = (num_steps, on_begin, on_end=None))]
    fn run_for<'py>(
        &self,
        num_steps: u64,
        on_begin: Bound<'py, PyAny>,
        on_end: Option<Bound<'py, PyAny>>,
    ) -> PyResult<()> {
        let mut session = self.lock()?;
        let failure: RefCell<Option<PyErr>> = RefCell::new(None);
        let call = |hook: &Bound<'py, PyAny>, time: Duration| {
            if failure.borrow().is_some() {
                return;
            }
            if let Err(e) = hook.call1((time,)) {
                *failure.borrow_mut() = Some(e);
            }
        };

        let mut hooks =
            UpdateHooks::new().on_begin(|info| call(&on_begin, info.sim_time.into()));
        if let Some(on_end) = &on_end {
            hooks = hooks.on_end(|info| call(on_end, info.sim_time.into()));
        }
        session.run_for(num_steps, hooks).map_err(session_err)?;

        match failure.into_inner() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Restore the initial pose and seed and zero the clock.
    fn reset(&self, py: Python<'_>) -> PyResult<()> {
        let mut guard = self.lock()?;
        let session: &mut Inner = &mut guard;
        py.detach(|| session.reset()).map_err(session_err)
    }

    /// Release the engine. Idempotent; the session cannot be restarted.
    fn shutdown(&self, py: Python<'_>) -> PyResult<()> {
        let mut guard = self.lock()?;
        let session: &mut Inner = &mut guard;
        py.detach(|| session.shutdown());
        Ok(())
    }

    /// Simulated time as a timedelta; zero before start.
    #[getter]
    fn simulation_time(&self) -> PyResult<Duration> {
        Ok(self.lock()?.simulation_time().into())
    }

    /// Whether the session is started and steppable.
    #[getter]
    fn initialized(&self) -> PyResult<bool> {
        Ok(self.lock()?.is_initialized())
    }

    /// Name of the loaded model, or None before start.
    #[getter]
    fn model_name(&self) -> PyResult<Option<String>> {
        Ok(self.lock()?.model_name().map(str::to_string))
    }

    /// Accessor for the link `name`. Raises LookupError if absent.
    fn get_body(&self, name: &str) -> PyResult<Body> {
        let inner = self.lock()?.body(name).map_err(session_err)?;
        Ok(Body { inner })
    }

    /// Accessor for the joint `name`. Raises LookupError if absent.
    fn get_actuator(&self, name: &str) -> PyResult<Actuator> {
        let inner = self.lock()?.actuator(name).map_err(session_err)?;
        Ok(Actuator { inner })
    }

    /// Names of the model's links, in declaration order.
    fn body_names(&self) -> PyResult<Vec<String>> {
        self.lock()?.body_names().map_err(session_err)
    }

    /// Names of the model's joints, in declaration order.
    fn actuator_names(&self) -> PyResult<Vec<String>> {
        self.lock()?.actuator_names().map_err(session_err)
    }

    fn __enter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    #[pyo3(signature = (_exc_type=None, _exc_val=None, _exc_tb=None))]
    fn __exit__(
        &self,
        py: Python<'_>,
        _exc_type: Option<&Bound<'_, PyAny>>,
        _exc_val: Option<&Bound<'_, PyAny>>,
        _exc_tb: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<bool> {
        self.shutdown(py)?;
        Ok(false)
    }
}
