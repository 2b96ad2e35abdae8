//! Process-wide engine lifecycle.

use std::path::PathBuf;

use rigsim_core::EngineError;

use crate::world::World;

/// Options passed to [`Engine::setup`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Emit engine diagnostics.
    pub verbose: bool,
    /// Extra directories searched for world files and media.
    pub media_paths: Vec<PathBuf>,
    /// Extra directories searched for `model://` includes.
    pub model_paths: Vec<PathBuf>,
}

/// A physics engine backend.
///
/// The expected call order is `setup`, then any number of `load_world`
/// calls, then `shutdown`. Backends holding process-global state may
/// refuse a second `setup` before `shutdown`.
pub trait Engine: Send {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    /// Brings the engine up with the given verbosity and search paths.
    fn setup(&mut self, options: &EngineOptions) -> Result<(), EngineError>;

    /// Loads a world file, resolving `path` against the media paths.
    fn load_world(&mut self, path: &str) -> Result<Box<dyn World>, EngineError>;

    /// Tears the engine down. Worlds it produced must not be stepped
    /// afterwards.
    fn shutdown(&mut self) -> Result<(), EngineError>;
}
