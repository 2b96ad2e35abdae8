//! The reference world: clock, model registry and tick protocol.

use indexmap::IndexMap;
use nalgebra::Vector3;
use rigsim_core::{ActuatorId, BodyId, EngineError, ModelId, Pose, SimTimestamp};
use rigsim_description::{parse_model, ModelDescription, WorldDescription};
use tracing::{debug, warn};

use super::model::{ArticulatedModel, TickContext};
use super::noise::EffortNoise;
use super::pacer::RealTimePacer;
use super::physics::ReferencePhysics;
use crate::physics::Physics;
use crate::world::{ActuatorState, BodyState, UpdateInfo, World};

// Compile-time assertion: ReferenceWorld is Send (required by World).
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<ReferenceWorld>();
    }
};

/// A scene loaded by [`ReferenceEngine`](super::ReferenceEngine).
///
/// Models inserted with [`insert_model_string`](World::insert_model_string)
/// are validated immediately and become visible at the start of the next
/// tick.
pub struct ReferenceWorld {
    name: String,
    physics: ReferencePhysics,
    gravity: Vector3<f64>,
    ground_plane: bool,
    models: IndexMap<String, ArticulatedModel>,
    pending: Vec<ArticulatedModel>,
    /// Global body id to (model index, link index).
    bodies: Vec<(usize, usize)>,
    /// Global actuator id to (model index, joint index).
    actuators: Vec<(usize, usize)>,
    clock_nanos: u64,
    iterations: u64,
    running: bool,
    fault: Option<String>,
    noise: EffortNoise,
    pacer: RealTimePacer,
}

impl ReferenceWorld {
    /// Builds a world from its description, with already-resolved
    /// included models.
    pub fn new(
        desc: &WorldDescription,
        included: Vec<ModelDescription>,
        ground_plane: bool,
        quiet: bool,
    ) -> Result<Self, EngineError> {
        let physics = ReferencePhysics::from_description(&desc.physics, quiet).map_err(|reason| {
            EngineError::WorldLoadFailed {
                path: desc.name.clone(),
                reason,
            }
        })?;
        let mut world = Self {
            name: desc.name.clone(),
            physics,
            gravity: desc.gravity,
            ground_plane,
            models: IndexMap::new(),
            pending: Vec::new(),
            bodies: Vec::new(),
            actuators: Vec::new(),
            clock_nanos: 0,
            iterations: 0,
            running: false,
            fault: None,
            noise: EffortNoise::new(desc.physics.effort_noise),
            pacer: RealTimePacer::default(),
        };
        for model in included.iter().chain(&desc.models) {
            let built = ArticulatedModel::from_description(model)
                .map_err(|reason| EngineError::InvalidModel { reason })?;
            world.check_unique(built.name())?;
            world.register(built);
        }
        Ok(world)
    }

    /// Whether the world has a ground plane.
    pub fn has_ground_plane(&self) -> bool {
        self.ground_plane
    }

    /// Gravity in the world frame.
    pub fn gravity(&self) -> Vector3<f64> {
        self.gravity
    }

    /// Names of materialized models.
    pub fn model_names(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    fn check_unique(&self, name: &str) -> Result<(), EngineError> {
        if self.models.contains_key(name) || self.pending.iter().any(|m| m.name() == name) {
            return Err(EngineError::InvalidModel {
                reason: format!("a model named '{name}' already exists"),
            });
        }
        Ok(())
    }

    fn register(&mut self, mut model: ArticulatedModel) {
        let index = self.models.len();
        model.body_offset = self.bodies.len() as u32;
        model.actuator_offset = self.actuators.len() as u32;
        self.bodies.extend((0..model.link_count()).map(|l| (index, l)));
        self.actuators.extend((0..model.joint_count()).map(|j| (index, j)));
        debug!(world = %self.name, model = %model.name(), "model materialized");
        self.models.insert(model.name().to_string(), model);
    }

    fn model(&self, id: ModelId) -> Result<&ArticulatedModel, EngineError> {
        self.models
            .get_index(id.0 as usize)
            .map(|(_, m)| m)
            .ok_or(EngineError::UnknownModel(id))
    }

    fn model_mut(&mut self, id: ModelId) -> Result<&mut ArticulatedModel, EngineError> {
        self.models
            .get_index_mut(id.0 as usize)
            .map(|(_, m)| m)
            .ok_or(EngineError::UnknownModel(id))
    }

    fn info(&self) -> UpdateInfo {
        UpdateInfo {
            sim_time: SimTimestamp::from_nanos(self.clock_nanos),
            iteration: self.iterations,
        }
    }
}

impl World for ReferenceWorld {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert_model_string(&mut self, sdf: &str) -> Result<(), EngineError> {
        let desc = parse_model(sdf).map_err(|e| EngineError::InvalidModel {
            reason: e.to_string(),
        })?;
        let model = ArticulatedModel::from_description(&desc)
            .map_err(|reason| EngineError::InvalidModel { reason })?;
        self.check_unique(model.name())?;
        debug!(world = %self.name, model = %model.name(), "model queued for insertion");
        self.pending.push(model);
        Ok(())
    }

    fn begin_update(&mut self) -> Result<UpdateInfo, EngineError> {
        if self.running {
            return Err(EngineError::UpdateInProgress);
        }
        if let Some(reason) = &self.fault {
            return Err(EngineError::Faulted {
                reason: reason.clone(),
            });
        }
        for model in std::mem::take(&mut self.pending) {
            self.register(model);
        }
        let step = u64::try_from(self.physics.step_size().as_nanos()).unwrap_or(u64::MAX);
        self.clock_nanos = self
            .clock_nanos
            .checked_add(step)
            .ok_or_else(|| EngineError::Faulted {
                reason: "simulation clock overflow".to_string(),
            })?;
        self.iterations += 1;
        self.running = true;
        Ok(self.info())
    }

    fn end_update(&mut self) -> Result<UpdateInfo, EngineError> {
        if !self.running {
            return Err(EngineError::NoUpdateInProgress);
        }
        self.running = false;

        if self.physics.is_enabled() {
            let mut ctx = TickContext {
                dt: self.physics.step_size().as_secs_f64(),
                gravity: self.gravity,
                ground_plane: self.ground_plane,
                quiet: self.physics.is_quiet(),
                noise: &mut self.noise,
            };
            for model in self.models.values_mut() {
                if let Err(reason) = model.step(&mut ctx) {
                    warn!(world = %self.name, %reason, "world faulted");
                    self.fault = Some(reason.clone());
                    return Err(EngineError::Faulted { reason });
                }
            }
        } else {
            for model in self.models.values_mut() {
                model.skip_tick();
            }
        }

        self.pacer.pace(self.physics.real_time_update_rate());
        Ok(self.info())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn sim_time(&self) -> SimTimestamp {
        SimTimestamp::from_nanos(self.clock_nanos)
    }

    fn iterations(&self) -> u64 {
        self.iterations
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        if self.running {
            return Err(EngineError::UpdateInProgress);
        }
        self.clock_nanos = 0;
        self.iterations = 0;
        self.fault = None;
        self.physics.restore_default_rate();
        self.pacer.reset();
        for model in self.models.values_mut() {
            model.reset();
        }
        Ok(())
    }

    fn reseed(&mut self, seed: u64) {
        self.noise.reseed(seed);
    }

    fn physics(&self) -> &dyn Physics {
        &self.physics
    }

    fn physics_mut(&mut self) -> &mut dyn Physics {
        &mut self.physics
    }

    fn model_by_name(&self, name: &str) -> Option<ModelId> {
        self.models
            .get_index_of(name)
            .map(|i| ModelId(i as u32))
    }

    fn body_by_name(&self, model: ModelId, name: &str) -> Option<BodyId> {
        let m = self.model(model).ok()?;
        m.link_index(name)
            .map(|l| BodyId(m.body_offset + l as u32))
    }

    fn actuator_by_name(&self, model: ModelId, name: &str) -> Option<ActuatorId> {
        let m = self.model(model).ok()?;
        m.joint_index(name)
            .map(|j| ActuatorId(m.actuator_offset + j as u32))
    }

    fn body_names(&self, model: ModelId) -> Result<Vec<String>, EngineError> {
        Ok(self.model(model)?.link_names())
    }

    fn actuator_names(&self, model: ModelId) -> Result<Vec<String>, EngineError> {
        Ok(self.model(model)?.joint_names())
    }

    fn set_model_initial_pose(&mut self, model: ModelId, pose: Pose) -> Result<(), EngineError> {
        self.model_mut(model)?.set_initial_pose(pose);
        Ok(())
    }

    fn set_model_pose(&mut self, model: ModelId, pose: Pose) -> Result<(), EngineError> {
        self.model_mut(model)?.set_pose(pose);
        Ok(())
    }

    fn body_state(&self, body: BodyId) -> Result<BodyState, EngineError> {
        let &(m, l) = self
            .bodies
            .get(body.0 as usize)
            .ok_or(EngineError::UnknownBody(body))?;
        self.models
            .get_index(m)
            .and_then(|(_, model)| model.link_state(l))
            .ok_or(EngineError::UnknownBody(body))
    }

    fn actuator_state(&self, actuator: ActuatorId) -> Result<ActuatorState, EngineError> {
        let &(m, j) = self
            .actuators
            .get(actuator.0 as usize)
            .ok_or(EngineError::UnknownActuator(actuator))?;
        self.models
            .get_index(m)
            .and_then(|(_, model)| model.joint_state(j))
            .ok_or(EngineError::UnknownActuator(actuator))
    }

    fn set_actuator_effort(
        &mut self,
        actuator: ActuatorId,
        effort: f64,
    ) -> Result<(), EngineError> {
        let &(m, j) = self
            .actuators
            .get(actuator.0 as usize)
            .ok_or(EngineError::UnknownActuator(actuator))?;
        let commanded = self
            .models
            .get_index_mut(m)
            .is_some_and(|(_, model)| model.command_effort(j, effort));
        if commanded {
            Ok(())
        } else {
            Err(EngineError::UnknownActuator(actuator))
        }
    }
}

impl std::fmt::Debug for ReferenceWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceWorld")
            .field("name", &self.name)
            .field("models", &self.models.len())
            .field("pending", &self.pending.len())
            .field("sim_time", &self.sim_time())
            .field("running", &self.running)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigsim_description::parse_world;
    use std::time::Duration;

    const WORLD: &str = r#"<sdf version="1.6"><world name="test">
        <physics type="ode"><max_step_size>0.001</max_step_size>
          <real_time_update_rate>0</real_time_update_rate></physics>
      </world></sdf>"#;

    const BOX: &str = r#"<sdf version="1.6"><model name="box">
        <link name="base"/><link name="lid"/>
        <joint name="hinge" type="revolute"><parent>base</parent><child>lid</child></joint>
      </model></sdf>"#;

    fn world() -> ReferenceWorld {
        ReferenceWorld::new(&parse_world(WORLD).unwrap(), Vec::new(), true, true).unwrap()
    }

    #[test]
    fn inserted_model_appears_after_one_tick() {
        let mut w = world();
        w.insert_model_string(BOX).unwrap();
        assert!(w.model_by_name("box").is_none());
        w.run(1).unwrap();
        let id = w.model_by_name("box").unwrap();
        assert!(w.body_by_name(id, "lid").is_some());
        assert!(w.actuator_by_name(id, "hinge").is_some());
        assert!(w.body_by_name(id, "hinge").is_none());
    }

    #[test]
    fn invalid_model_is_rejected_on_insert() {
        let mut w = world();
        assert!(matches!(
            w.insert_model_string("<sdf><model/></sdf>"),
            Err(EngineError::InvalidModel { .. })
        ));
    }

    #[test]
    fn duplicate_model_name_is_rejected() {
        let mut w = world();
        w.insert_model_string(BOX).unwrap();
        assert!(w.insert_model_string(BOX).is_err());
    }

    #[test]
    fn clock_advances_at_begin_update() {
        let mut w = world();
        let info = w.begin_update().unwrap();
        assert!(w.is_running());
        assert_eq!(info.sim_time.as_duration(), Duration::from_millis(1));
        assert_eq!(info.iteration, 1);
        assert_eq!(w.end_update().unwrap(), info);
        assert!(!w.is_running());
    }

    #[test]
    fn update_protocol_is_enforced() {
        let mut w = world();
        assert_eq!(w.end_update(), Err(EngineError::NoUpdateInProgress));
        w.begin_update().unwrap();
        assert_eq!(w.begin_update(), Err(EngineError::UpdateInProgress));
        assert_eq!(w.reset(), Err(EngineError::UpdateInProgress));
        w.end_update().unwrap();
    }

    #[test]
    fn reset_zeroes_clock_and_restores_rate() {
        let mut w = world();
        w.physics_mut().set_real_time_update_rate(0.0);
        w.run(5).unwrap();
        assert_eq!(w.iterations(), 5);
        w.physics_mut().set_real_time_update_rate(250.0);
        w.reset().unwrap();
        assert_eq!(w.sim_time(), SimTimestamp::ZERO);
        assert_eq!(w.iterations(), 0);
        assert_eq!(w.physics().real_time_update_rate(), 0.0);
    }

    #[test]
    fn ids_are_global_across_models() {
        let mut w = world();
        w.insert_model_string(BOX).unwrap();
        w.insert_model_string(&BOX.replace("name=\"box\"", "name=\"crate\"")).unwrap();
        w.run(1).unwrap();
        let a = w.model_by_name("box").unwrap();
        let b = w.model_by_name("crate").unwrap();
        let la = w.body_by_name(a, "lid").unwrap();
        let lb = w.body_by_name(b, "lid").unwrap();
        assert_ne!(la, lb);
        assert_eq!(w.body_names(b).unwrap(), vec!["base", "lid"]);
    }

    #[test]
    fn effort_reads_back_until_reset() {
        let mut w = world();
        w.insert_model_string(BOX).unwrap();
        w.run(1).unwrap();
        let id = w.model_by_name("box").unwrap();
        let hinge = w.actuator_by_name(id, "hinge").unwrap();
        w.set_actuator_effort(hinge, 1.0).unwrap();
        assert_eq!(w.actuator_state(hinge).unwrap().effort, 1.0);
        w.run(1).unwrap();
        assert_eq!(w.actuator_state(hinge).unwrap().effort, 1.0);
        w.reset().unwrap();
        assert_eq!(w.actuator_state(hinge).unwrap(), ActuatorState::default());
    }

    #[test]
    fn unknown_ids_are_errors() {
        let w = world();
        assert_eq!(w.body_state(BodyId(9)), Err(EngineError::UnknownBody(BodyId(9))));
        assert!(w.actuator_state(ActuatorId(0)).is_err());
        assert!(w.body_names(ModelId(0)).is_err());
    }

    #[test]
    fn disabled_physics_still_advances_clock() {
        let mut w = world();
        w.insert_model_string(BOX).unwrap();
        w.run(1).unwrap();
        let id = w.model_by_name("box").unwrap();
        let hinge = w.actuator_by_name(id, "hinge").unwrap();
        w.physics_mut().set_enabled(false);
        w.set_actuator_effort(hinge, 5.0).unwrap();
        w.run(3).unwrap();
        assert_eq!(w.sim_time().as_duration(), Duration::from_millis(4));
        assert_eq!(w.actuator_state(hinge).unwrap().velocity, 0.0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn clock_is_ticks_times_step(ticks in 1u64..200) {
                let mut w = world();
                w.run(ticks).unwrap();
                prop_assert_eq!(w.iterations(), ticks);
                prop_assert_eq!(
                    w.sim_time().as_duration(),
                    Duration::from_millis(ticks)
                );
                prop_assert!(!w.is_running());
            }

            #[test]
            fn effort_is_held_for_any_finite_command(effort in -1.0e3f64..1.0e3) {
                let mut w = world();
                w.insert_model_string(BOX).unwrap();
                w.run(1).unwrap();
                let id = w.model_by_name("box").unwrap();
                let hinge = w.actuator_by_name(id, "hinge").unwrap();
                w.set_actuator_effort(hinge, effort).unwrap();
                prop_assert_eq!(w.actuator_state(hinge).unwrap().effort, effort);
            }
        }
    }
}
