//! Scriptable engine backend for exercising session failure paths.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rigsim_core::{ActuatorId, BodyId, EngineError, ModelId, Pose, SimTimestamp};
use rigsim_description::extract_model_name;
use rigsim_engine::{ActuatorState, BodyState, Engine, EngineOptions, Physics, UpdateInfo, World};

/// Where a [`MockEngine`] bring-up should fail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MockFailure {
    /// Everything succeeds; the model appears after the first tick.
    #[default]
    None,
    /// `setup` fails.
    Setup,
    /// `load_world` fails.
    LoadWorld,
    /// `insert_model_string` fails.
    InsertModel,
    /// The inserted model never becomes queryable.
    NeverMaterialize,
    /// `shutdown` fails.
    Shutdown,
}

/// Call counters shared between a [`MockEngine`], its worlds and the test.
#[derive(Debug, Default)]
pub struct MockStats {
    pub setups: AtomicU32,
    pub shutdowns: AtomicU32,
    pub worlds_loaded: AtomicU32,
    pub worlds_dropped: AtomicU32,
    pub ticks: AtomicU64,
}

impl MockStats {
    pub fn setups(&self) -> u32 {
        self.setups.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> u32 {
        self.shutdowns.load(Ordering::SeqCst)
    }

    pub fn worlds_loaded(&self) -> u32 {
        self.worlds_loaded.load(Ordering::SeqCst)
    }

    pub fn worlds_dropped(&self) -> u32 {
        self.worlds_dropped.load(Ordering::SeqCst)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

// ── MockEngine ──────────────────────────────────────────────────────

/// An [`Engine`] that fails at a configured stage.
pub struct MockEngine {
    failure: MockFailure,
    stats: Arc<MockStats>,
    set_up: bool,
}

impl MockEngine {
    pub fn new(failure: MockFailure) -> Self {
        Self {
            failure,
            stats: Arc::new(MockStats::default()),
            set_up: false,
        }
    }

    /// Counters observable after the engine has been moved into a session.
    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }
}

impl Engine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn setup(&mut self, _options: &EngineOptions) -> Result<(), EngineError> {
        self.stats.setups.fetch_add(1, Ordering::SeqCst);
        if self.failure == MockFailure::Setup {
            return Err(EngineError::SetupFailed {
                reason: "scripted setup failure".to_string(),
            });
        }
        self.set_up = true;
        Ok(())
    }

    fn load_world(&mut self, path: &str) -> Result<Box<dyn World>, EngineError> {
        if !self.set_up {
            return Err(EngineError::NotSetUp);
        }
        if self.failure == MockFailure::LoadWorld {
            return Err(EngineError::WorldLoadFailed {
                path: path.to_string(),
                reason: "scripted load failure".to_string(),
            });
        }
        self.stats.worlds_loaded.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockWorld::new(self.failure, Arc::clone(&self.stats))))
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        self.stats.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.set_up = false;
        if self.failure == MockFailure::Shutdown {
            return Err(EngineError::ShutdownFailed {
                reason: "scripted shutdown failure".to_string(),
            });
        }
        Ok(())
    }
}

// ── MockWorld ───────────────────────────────────────────────────────

/// Physics settings of a [`MockWorld`]. Cannot silence diagnostics.
#[derive(Debug)]
struct MockPhysics {
    rate: f64,
    enabled: bool,
}

impl Physics for MockPhysics {
    fn kind(&self) -> &str {
        "mock"
    }

    fn step_size(&self) -> Duration {
        Duration::from_millis(1)
    }

    fn real_time_update_rate(&self) -> f64 {
        self.rate
    }

    fn set_real_time_update_rate(&mut self, rate: f64) {
        if rate >= 0.0 {
            self.rate = rate;
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// A world with one optional model, no bodies and no actuators.
pub struct MockWorld {
    failure: MockFailure,
    stats: Arc<MockStats>,
    physics: MockPhysics,
    pending: Option<String>,
    model: Option<String>,
    ticks: u64,
    running: bool,
}

impl MockWorld {
    fn new(failure: MockFailure, stats: Arc<MockStats>) -> Self {
        Self {
            failure,
            stats,
            physics: MockPhysics {
                rate: 0.0,
                enabled: true,
            },
            pending: None,
            model: None,
            ticks: 0,
            running: false,
        }
    }

    fn check_model(&self, model: ModelId) -> Result<(), EngineError> {
        match (&self.model, model) {
            (Some(_), ModelId(0)) => Ok(()),
            _ => Err(EngineError::UnknownModel(model)),
        }
    }
}

impl Drop for MockWorld {
    fn drop(&mut self) {
        self.stats.worlds_dropped.fetch_add(1, Ordering::SeqCst);
    }
}

impl World for MockWorld {
    fn name(&self) -> &str {
        "mock"
    }

    fn insert_model_string(&mut self, sdf: &str) -> Result<(), EngineError> {
        if self.failure == MockFailure::InsertModel {
            return Err(EngineError::InvalidModel {
                reason: "scripted insertion failure".to_string(),
            });
        }
        let name = extract_model_name(sdf).map_err(|e| EngineError::InvalidModel {
            reason: e.to_string(),
        })?;
        self.pending = Some(name);
        Ok(())
    }

    fn begin_update(&mut self) -> Result<UpdateInfo, EngineError> {
        if self.running {
            return Err(EngineError::UpdateInProgress);
        }
        if self.failure != MockFailure::NeverMaterialize {
            if let Some(name) = self.pending.take() {
                self.model = Some(name);
            }
        }
        self.ticks += 1;
        self.running = true;
        self.stats.ticks.fetch_add(1, Ordering::SeqCst);
        Ok(UpdateInfo {
            sim_time: self.sim_time(),
            iteration: self.ticks,
        })
    }

    fn end_update(&mut self) -> Result<UpdateInfo, EngineError> {
        if !self.running {
            return Err(EngineError::NoUpdateInProgress);
        }
        self.running = false;
        Ok(UpdateInfo {
            sim_time: self.sim_time(),
            iteration: self.ticks,
        })
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn sim_time(&self) -> SimTimestamp {
        SimTimestamp::from_nanos(self.ticks * 1_000_000)
    }

    fn iterations(&self) -> u64 {
        self.ticks
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        if self.running {
            return Err(EngineError::UpdateInProgress);
        }
        self.ticks = 0;
        Ok(())
    }

    fn reseed(&mut self, _seed: u64) {}

    fn physics(&self) -> &dyn Physics {
        &self.physics
    }

    fn physics_mut(&mut self) -> &mut dyn Physics {
        &mut self.physics
    }

    fn model_by_name(&self, name: &str) -> Option<ModelId> {
        match &self.model {
            Some(m) if m == name => Some(ModelId(0)),
            _ => None,
        }
    }

    fn body_by_name(&self, _model: ModelId, _name: &str) -> Option<BodyId> {
        None
    }

    fn actuator_by_name(&self, _model: ModelId, _name: &str) -> Option<ActuatorId> {
        None
    }

    fn body_names(&self, model: ModelId) -> Result<Vec<String>, EngineError> {
        self.check_model(model).map(|()| Vec::new())
    }

    fn actuator_names(&self, model: ModelId) -> Result<Vec<String>, EngineError> {
        self.check_model(model).map(|()| Vec::new())
    }

    fn set_model_initial_pose(&mut self, model: ModelId, _pose: Pose) -> Result<(), EngineError> {
        self.check_model(model)
    }

    fn set_model_pose(&mut self, model: ModelId, _pose: Pose) -> Result<(), EngineError> {
        self.check_model(model)
    }

    fn body_state(&self, body: BodyId) -> Result<BodyState, EngineError> {
        Err(EngineError::UnknownBody(body))
    }

    fn actuator_state(&self, actuator: ActuatorId) -> Result<ActuatorState, EngineError> {
        Err(EngineError::UnknownActuator(actuator))
    }

    fn set_actuator_effort(
        &mut self,
        actuator: ActuatorId,
        _effort: f64,
    ) -> Result<(), EngineError> {
        Err(EngineError::UnknownActuator(actuator))
    }
}
