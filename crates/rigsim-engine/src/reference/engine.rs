//! World loading and `model://` include resolution.

use std::fs;
use std::path::{Path, PathBuf};

use rigsim_core::EngineError;
use rigsim_description::{parse_model, parse_world, IncludeDescription, ModelDescription};
use tracing::{debug, info};

use super::world::ReferenceWorld;
use crate::engine::{Engine, EngineOptions};
use crate::world::World;

/// Path of the world that is always available, even with no media paths.
pub const BUILTIN_EMPTY_WORLD: &str = "worlds/empty.world";

const EMPTY_WORLD_SDF: &str = r#"<?xml version="1.0"?>
<sdf version="1.6">
  <world name="default">
    <include><uri>model://ground_plane</uri></include>
    <include><uri>model://sun</uri></include>
    <physics type="ode">
      <max_step_size>0.001</max_step_size>
      <real_time_factor>1</real_time_factor>
      <real_time_update_rate>1000</real_time_update_rate>
    </physics>
  </world>
</sdf>
"#;

/// The deterministic reference [`Engine`].
///
/// Holds no process-global state, so several instances may coexist; the
/// one-engine-per-process rule is enforced by the session layer.
#[derive(Debug, Default)]
pub struct ReferenceEngine {
    options: Option<EngineOptions>,
}

impl ReferenceEngine {
    /// Creates an engine that has not been set up.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether [`setup`](Engine::setup) succeeded and `shutdown` has not
    /// been called since.
    pub fn is_set_up(&self) -> bool {
        self.options.is_some()
    }

    fn read_world(options: &EngineOptions, path: &str) -> Result<String, EngineError> {
        let load_failed = |reason: String| EngineError::WorldLoadFailed {
            path: path.to_string(),
            reason,
        };
        let direct = Path::new(path);
        let candidates = std::iter::once(direct.to_path_buf())
            .chain(options.media_paths.iter().map(|dir| dir.join(direct)));
        for candidate in candidates {
            if candidate.is_file() {
                debug!(path = %candidate.display(), "reading world file");
                return fs::read_to_string(&candidate).map_err(|e| load_failed(e.to_string()));
            }
        }
        if path == BUILTIN_EMPTY_WORLD {
            return Ok(EMPTY_WORLD_SDF.to_string());
        }
        Err(load_failed("not found in the media paths".to_string()))
    }

    fn resolve_include(
        options: &EngineOptions,
        include: &IncludeDescription,
    ) -> Result<Option<ModelDescription>, String> {
        let Some(name) = include.model_uri_name() else {
            return Err(format!("unsupported include uri '{}'", include.uri));
        };
        let Some(file) = find_model_file(&options.model_paths, name) else {
            return match name {
                "ground_plane" | "sun" => Ok(None),
                _ => Err(format!("model '{name}' not found in the model paths")),
            };
        };
        let text = fs::read_to_string(&file).map_err(|e| format!("{}: {e}", file.display()))?;
        let mut model = parse_model(&text).map_err(|e| format!("{}: {e}", file.display()))?;
        if let Some(n) = &include.name {
            model.name = n.clone();
        }
        if let Some(pose) = include.pose {
            model.pose = pose;
        }
        if let Some(is_static) = include.is_static {
            model.is_static = is_static;
        }
        Ok(Some(model))
    }
}

fn find_model_file(model_paths: &[PathBuf], name: &str) -> Option<PathBuf> {
    model_paths
        .iter()
        .map(|dir| dir.join(name).join("model.sdf"))
        .find(|p| p.is_file())
}

impl Engine for ReferenceEngine {
    fn name(&self) -> &str {
        "reference"
    }

    fn setup(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        if self.options.is_some() {
            return Err(EngineError::SetupFailed {
                reason: "engine is already set up".to_string(),
            });
        }
        debug!(
            verbose = options.verbose,
            media_paths = options.media_paths.len(),
            model_paths = options.model_paths.len(),
            "reference engine set up"
        );
        self.options = Some(options.clone());
        Ok(())
    }

    fn load_world(&mut self, path: &str) -> Result<Box<dyn World>, EngineError> {
        let options = self.options.as_ref().ok_or(EngineError::NotSetUp)?;
        let load_failed = |reason: String| EngineError::WorldLoadFailed {
            path: path.to_string(),
            reason,
        };

        let text = Self::read_world(options, path)?;
        let desc = parse_world(&text).map_err(|e| load_failed(e.to_string()))?;

        let mut ground_plane = false;
        let mut included = Vec::new();
        for include in &desc.includes {
            match Self::resolve_include(options, include).map_err(load_failed)? {
                Some(model) => included.push(model),
                None => ground_plane |= include.model_uri_name() == Some("ground_plane"),
            }
        }

        let world = ReferenceWorld::new(&desc, included, ground_plane, false).map_err(
            |e| match e {
                EngineError::WorldLoadFailed { reason, .. } => load_failed(reason),
                other => load_failed(other.to_string()),
            },
        )?;
        if options.verbose {
            info!(path, world = %world.name(), ground_plane, "world loaded");
        } else {
            debug!(path, world = %world.name(), ground_plane, "world loaded");
        }
        Ok(Box::new(world))
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        match self.options.take() {
            Some(_) => {
                debug!("reference engine shut down");
                Ok(())
            }
            None => Err(EngineError::NotSetUp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_world_loads_without_media_paths() {
        let mut engine = ReferenceEngine::new();
        engine.setup(&EngineOptions::default()).unwrap();
        let world = engine.load_world(BUILTIN_EMPTY_WORLD).unwrap();
        assert_eq!(world.name(), "default");
        assert_eq!(world.physics().real_time_update_rate(), 1000.0);
    }

    #[test]
    fn load_before_setup_is_rejected() {
        let mut engine = ReferenceEngine::new();
        assert!(matches!(
            engine.load_world(BUILTIN_EMPTY_WORLD),
            Err(EngineError::NotSetUp)
        ));
    }

    #[test]
    fn setup_twice_fails_until_shutdown() {
        let mut engine = ReferenceEngine::new();
        engine.setup(&EngineOptions::default()).unwrap();
        assert!(matches!(
            engine.setup(&EngineOptions::default()),
            Err(EngineError::SetupFailed { .. })
        ));
        engine.shutdown().unwrap();
        assert!(!engine.is_set_up());
        assert_eq!(engine.shutdown(), Err(EngineError::NotSetUp));
        engine.setup(&EngineOptions::default()).unwrap();
    }

    #[test]
    fn missing_world_reports_path() {
        let mut engine = ReferenceEngine::new();
        engine.setup(&EngineOptions::default()).unwrap();
        match engine.load_world("worlds/nowhere.world") {
            Err(EngineError::WorldLoadFailed { path, .. }) => {
                assert_eq!(path, "worlds/nowhere.world");
            }
            other => panic!("unexpected {:?}", other.map(|w| w.name().to_string())),
        }
    }

    #[test]
    fn non_model_uri_is_unsupported() {
        let include = IncludeDescription {
            uri: "file:///tmp/x".to_string(),
            name: None,
            pose: None,
            is_static: None,
        };
        assert!(ReferenceEngine::resolve_include(&EngineOptions::default(), &include).is_err());
    }
}
