//! The simulation session: lifecycle, stepping protocol and reset.
//!
//! A [`Session`] moves through three states:
//!
//! - `Uninitialized`: constructed, or a `start` attempt failed and was
//!   rolled back. `start` may be called (again).
//! - `Ready`: the engine is up, the world is loaded and the model is
//!   queryable. Stepping, reset and accessor lookup are available.
//! - `ShutDown`: terminal. Reached by [`shutdown()`](Session::shutdown) or
//!   by dropping the session.
//!
//! # Exclusivity
//!
//! Physics engines commonly keep process-global state, so at most one
//! session per process holds the engine. The first successful `start` takes
//! a process-wide lease; a second `start` anywhere in the process fails with
//! [`SessionError::Conflict`] until the first session shuts down.
//!
//! # Reproducibility
//!
//! [`reset()`](Session::reset) restores the configured pose, reseeds the
//! world with the configured seed and zeroes the clock. Identical configs
//! and identical call sequences give bit-identical trajectories.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use rigsim_core::{ModelId, SimTimestamp};
use rigsim_description::extract_model_name;
use rigsim_engine::{Engine, ReferenceEngine, World};
use tracing::{debug, error, info, warn};

use crate::accessor::{with_world, Actuator, Body, SharedWorld};
use crate::config::{AvailabilityPolicy, SessionConfig};
use crate::error::{AccessorKind, SessionError};
use crate::hooks::UpdateHooks;
use crate::lease::EngineLease;

// Compile-time assertion: Session is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Session>();
    }
};

// ── SessionState ────────────────────────────────────────────────────

/// Lifecycle state of a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Not started, or a start attempt was rolled back.
    Uninitialized,
    /// Started and steppable.
    Ready,
    /// Shut down; terminal.
    ShutDown,
}

// ── Session ─────────────────────────────────────────────────────────

/// Resources held while the session is `Ready`.
struct Live {
    world: SharedWorld,
    model: ModelId,
    model_name: String,
    _lease: EngineLease,
}

/// Owner of one simulation: engine, world and model.
///
/// # Example
///
/// ```ignore
/// let mut session = Session::new(SessionConfig {
///     model_description: std::fs::read_to_string("robot.sdf")?,
///     ..SessionConfig::default()
/// });
/// session.start()?;
/// let wheel = session.actuator("left_wheel_hinge")?;
/// session.run_for(100, UpdateHooks::new().on_begin(|_| {
///     let _ = wheel.set_torque(2.0);
/// }))?;
/// ```
pub struct Session {
    config: SessionConfig,
    engine: Box<dyn Engine>,
    state: SessionState,
    live: Option<Live>,
}

impl Session {
    /// Creates an unstarted session on the [`ReferenceEngine`].
    pub fn new(config: SessionConfig) -> Self {
        Self::with_engine(config, Box::new(ReferenceEngine::new()))
    }

    /// Creates an unstarted session on the given engine backend.
    pub fn with_engine(config: SessionConfig, engine: Box<dyn Engine>) -> Self {
        Self {
            config,
            engine,
            state: SessionState::Uninitialized,
            live: None,
        }
    }

    /// The configuration this session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session is `Ready`.
    pub fn is_initialized(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Name of the loaded model, once started.
    pub fn model_name(&self) -> Option<&str> {
        self.live.as_ref().map(|l| l.model_name.as_str())
    }

    fn live(&self, op: &str) -> Result<&Live, SessionError> {
        match (self.state, &self.live) {
            (SessionState::Ready, Some(live)) => Ok(live),
            (SessionState::ShutDown, _) => Err(SessionError::NotReady {
                reason: format!("{op}: session has been shut down"),
            }),
            _ => Err(SessionError::NotReady {
                reason: format!("{op}: session has not been started"),
            }),
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Brings the engine up, loads the world, inserts the model and waits
    /// for it to become queryable, then resets to the configured pose and
    /// seed.
    ///
    /// Every failure after the engine lease is taken rolls back fully: the
    /// session returns to `Uninitialized` and may be started again.
    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Ready => {
                warn!("start called on a running session");
                return Err(SessionError::Conflict);
            }
            SessionState::ShutDown => {
                return Err(SessionError::NotReady {
                    reason: "start: session has been shut down".to_string(),
                });
            }
            SessionState::Uninitialized => {}
        }

        self.config.validate().map_err(|e| {
            error!(error = %e, "invalid session configuration");
            SessionError::from(e)
        })?;

        let lease = EngineLease::acquire().ok_or_else(|| {
            warn!("physics engine already in use by another session");
            SessionError::Conflict
        })?;

        let model_name = extract_model_name(&self.config.model_description).map_err(|e| {
            error!(error = %e, "cannot determine model name");
            SessionError::from(e)
        })?;

        let (world, model) = self.bring_up(&model_name)?;
        self.live = Some(Live {
            world: Arc::new(Mutex::new(world)),
            model,
            model_name,
            _lease: lease,
        });
        self.state = SessionState::Ready;

        if let Err(e) = self.reset().and_then(|()| self.configure_world()) {
            error!(error = %e, "session initialization failed");
            self.teardown();
            self.state = SessionState::Uninitialized;
            return Err(e);
        }

        info!(
            engine = self.engine.name(),
            world = %self.config.world_path,
            model = self.model_name().unwrap_or_default(),
            "simulation session started"
        );
        Ok(())
    }

    /// Engine setup, world load, model insertion and the availability
    /// wait. Shuts the engine down again on failure.
    fn bring_up(&mut self, model_name: &str) -> Result<(Box<dyn World>, ModelId), SessionError> {
        self.engine
            .setup(&self.config.engine_options())
            .map_err(|e| {
                error!(engine = self.engine.name(), error = %e, "engine setup failed");
                SessionError::EngineBringup(e)
            })?;

        let result = self.load_model(model_name);
        if let Err(e) = &result {
            error!(model = model_name, error = %e, "engine bring-up failed");
            self.shutdown_engine();
        }
        result
    }

    fn load_model(&mut self, model_name: &str) -> Result<(Box<dyn World>, ModelId), SessionError> {
        let mut world = self
            .engine
            .load_world(&self.config.world_path)
            .map_err(SessionError::EngineBringup)?;
        world
            .insert_model_string(&self.config.model_description)
            .map_err(SessionError::EngineBringup)?;
        let model = wait_for_model(world.as_mut(), model_name, &self.config.availability)?;
        Ok((world, model))
    }

    /// Post-reset world settings: diagnostics, physics toggle, and a
    /// listing of the model's links and joints.
    fn configure_world(&self) -> Result<(), SessionError> {
        let live = self.live("start")?;
        let (verbose, enable_physics) = (self.config.verbose, self.config.enable_physics);
        with_world(&live.world, |w| {
            if !verbose && !w.physics_mut().suppress_diagnostics() {
                debug!(kind = w.physics().kind(), "physics backend cannot silence diagnostics");
            }
            w.physics_mut().set_enabled(enable_physics);

            let links = w.body_names(live.model).map_err(SessionError::Engine)?;
            let joints = w.actuator_names(live.model).map_err(SessionError::Engine)?;
            info!(model = %live.model_name, ?links, ?joints, "model loaded");
            Ok(())
        })
    }

    /// Releases the world, the engine and the lease. Idempotent.
    ///
    /// Outstanding [`Body`] and [`Actuator`] accessors become invalid.
    /// An engine teardown failure is logged, not returned.
    pub fn shutdown(&mut self) {
        if self.state == SessionState::ShutDown {
            return;
        }
        let was_ready = self.live.is_some();
        self.teardown();
        self.state = SessionState::ShutDown;
        if was_ready {
            info!("simulation session shut down");
        }
    }

    fn teardown(&mut self) {
        if let Some(Live { world, _lease, .. }) = self.live.take() {
            // The world goes before the engine; the lease goes last.
            drop(world);
            self.shutdown_engine();
            drop(_lease);
        }
    }

    fn shutdown_engine(&mut self) {
        if let Err(e) = self.engine.shutdown() {
            error!(engine = self.engine.name(), error = %e, "engine shutdown failed");
        }
    }

    // ── Stepping ────────────────────────────────────────────────────

    /// Advances the simulation by exactly one tick.
    pub fn step(&mut self) -> Result<(), SessionError> {
        let live = self.live("step")?;
        with_world(&live.world, |w| {
            if w.is_running() {
                return Err(SessionError::NotReady {
                    reason: "step: world is mid-update".to_string(),
                });
            }
            w.run(1).map_err(SessionError::Engine)
        })
    }

    /// Advances the simulation by `steps` ticks, calling the hooks around
    /// each one.
    ///
    /// The begin hook runs after the clock advances and before dynamics are
    /// integrated, so efforts it commands apply to that tick. The end hook
    /// runs after integration. The world is not locked while a hook runs,
    /// so hooks may use [`Body`] and [`Actuator`] accessors.
    ///
    /// Requires `steps >= 1` and a begin hook. There is no cancellation:
    /// once ticking starts, all `steps` ticks run unless the engine fails.
    /// If a hook panics, the open tick is closed before the panic
    /// propagates.
    pub fn run_for(&mut self, steps: u64, hooks: UpdateHooks<'_>) -> Result<(), SessionError> {
        let live = self.live("run_for")?;
        if steps < 1 {
            return Err(SessionError::InvalidArgument {
                reason: "run_for needs at least one step".to_string(),
            });
        }
        let UpdateHooks { begin, mut end } = hooks;
        let Some(mut begin) = begin else {
            return Err(SessionError::InvalidArgument {
                reason: "run_for needs a begin hook".to_string(),
            });
        };

        let world = Arc::clone(&live.world);
        let _unwind = CloseTickOnUnwind { world: &world };
        for _ in 0..steps {
            let info = with_world(&world, |w| w.begin_update().map_err(SessionError::Engine))?;
            begin(&info);
            let info = with_world(&world, |w| w.end_update().map_err(SessionError::Engine))?;
            if let Some(end) = end.as_mut() {
                end(&info);
            }
        }
        Ok(())
    }

    /// Restores the configured pose, reseeds, zeroes the clock and
    /// re-applies a non-negative update-rate override.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        let live = self.live("reset")?;
        let pose = self.config.initial_pose();
        let (seed, rate) = (self.config.seed, self.config.real_time_update_rate);
        with_world(&live.world, |w| {
            w.set_model_initial_pose(live.model, pose)
                .and_then(|()| w.set_model_pose(live.model, pose))
                .map_err(SessionError::Engine)?;
            w.reseed(seed);
            w.reset().map_err(SessionError::Engine)?;
            if rate >= 0.0 {
                w.physics_mut().set_real_time_update_rate(rate);
            }
            Ok(())
        })?;
        debug!(seed, "session reset");
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Simulated time, or zero if the session is not `Ready`.
    pub fn simulation_time(&self) -> SimTimestamp {
        self.live("simulation_time")
            .and_then(|live| with_world(&live.world, |w| Ok(w.sim_time())))
            .unwrap_or(SimTimestamp::ZERO)
    }

    /// Accessor for the model link named `name`.
    pub fn body(&self, name: &str) -> Result<Body, SessionError> {
        let live = self.live("body")?;
        let id = with_world(&live.world, |w| Ok(w.body_by_name(live.model, name)))?;
        match id {
            Some(id) => Ok(Body::new(name.to_string(), id, &live.world)),
            None => Err(SessionError::Lookup {
                kind: AccessorKind::Body,
                name: name.to_string(),
            }),
        }
    }

    /// Accessor for the model joint named `name`.
    pub fn actuator(&self, name: &str) -> Result<Actuator, SessionError> {
        let live = self.live("actuator")?;
        let id = with_world(&live.world, |w| Ok(w.actuator_by_name(live.model, name)))?;
        match id {
            Some(id) => Ok(Actuator::new(name.to_string(), id, &live.world)),
            None => Err(SessionError::Lookup {
                kind: AccessorKind::Actuator,
                name: name.to_string(),
            }),
        }
    }

    /// Names of the model's links, in declaration order.
    pub fn body_names(&self) -> Result<Vec<String>, SessionError> {
        let live = self.live("body_names")?;
        with_world(&live.world, |w| {
            w.body_names(live.model).map_err(SessionError::Engine)
        })
    }

    /// Names of the model's joints, in declaration order.
    pub fn actuator_names(&self) -> Result<Vec<String>, SessionError> {
        let live = self.live("actuator_names")?;
        with_world(&live.world, |w| {
            w.actuator_names(live.model).map_err(SessionError::Engine)
        })
    }
}

/// Closes a tick left open by a panicking hook, so the world stays
/// steppable after the panic is caught.
struct CloseTickOnUnwind<'a> {
    world: &'a Mutex<Box<dyn World>>,
}

impl Drop for CloseTickOnUnwind<'_> {
    fn drop(&mut self) {
        if !thread::panicking() {
            return;
        }
        let mut world = self.world.lock().unwrap_or_else(PoisonError::into_inner);
        if world.is_running() {
            warn!("update hook panicked; closing the open tick");
            if let Err(e) = world.end_update() {
                error!(error = %e, "could not close the open tick");
            }
        }
    }
}

/// Ticks the world until `name` resolves, at most `policy.attempts` times.
fn wait_for_model(
    world: &mut dyn World,
    name: &str,
    policy: &AvailabilityPolicy,
) -> Result<ModelId, SessionError> {
    for attempt in 1..=policy.attempts {
        world.run(1).map_err(SessionError::EngineBringup)?;
        if let Some(id) = world.model_by_name(name) {
            debug!(model = name, attempt, "model available");
            return Ok(id);
        }
        if attempt < policy.attempts {
            thread::sleep(policy.interval);
        }
    }
    Err(SessionError::AvailabilityTimeout {
        model: name.to_string(),
        attempts: policy.attempts,
    })
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("engine", &self.engine.name())
            .field("state", &self.state)
            .field("model", &self.model_name())
            .finish()
    }
}
