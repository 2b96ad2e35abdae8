//! Per-tick callbacks for [`Session::run_for`](crate::Session::run_for).

use std::fmt;

use rigsim_engine::UpdateInfo;

type Hook<'h> = Box<dyn FnMut(&UpdateInfo) + 'h>;

/// Callbacks invoked around every tick of a multi-step run.
///
/// The begin hook is required by `run_for`; the end hook is optional.
/// Hooks may borrow from the caller's stack: the value is moved into
/// `run_for` and dropped when it returns.
///
/// ```ignore
/// let mut ticks = 0;
/// session.run_for(10, UpdateHooks::new().on_begin(|_| ticks += 1))?;
/// ```
#[derive(Default)]
pub struct UpdateHooks<'h> {
    pub(crate) begin: Option<Hook<'h>>,
    pub(crate) end: Option<Hook<'h>>,
}

impl<'h> UpdateHooks<'h> {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hook run immediately before each tick's physics update.
    pub fn on_begin(mut self, hook: impl FnMut(&UpdateInfo) + 'h) -> Self {
        self.begin = Some(Box::new(hook));
        self
    }

    /// Sets the hook run immediately after each tick's physics update.
    pub fn on_end(mut self, hook: impl FnMut(&UpdateInfo) + 'h) -> Self {
        self.end = Some(Box::new(hook));
        self
    }

    /// Whether a begin hook is set.
    pub fn has_begin(&self) -> bool {
        self.begin.is_some()
    }
}

impl fmt::Debug for UpdateHooks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateHooks")
            .field("begin", &self.begin.is_some())
            .field("end", &self.end.is_some())
            .finish()
    }
}
