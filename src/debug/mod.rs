//! Optional time-travel debugging.
//!
//! A store is generic over its [`Middleware`]. The default, [`NoDebug`], is a
//! zero-sized no-op whose hooks compile away, so a store without debugging
//! pays nothing for the seam. [`enable_debug`] swaps in a
//! [`DebugMiddleware`] that records every committed step in a [`History`]
//! and lets a [`Debugger`] inspect, rewind and re-dispatch.

mod context;
mod debugger;
mod history;
mod middleware;

use std::sync::{Arc, Weak};

use thiserror::Error;

pub use context::DebugContext;
pub use debugger::{Debugger, NullDebugger, TracingDebugger};
pub use history::{Entry, History, Step, Travel};
pub use middleware::{enable_debug, enable_debug_with, DebugMiddleware};

/// Store operations the debug layer drives.
pub trait DebugTarget<A, M>: Send + Sync {
    fn dispatch(&self, action: A);
    fn current(&self) -> Arc<M>;
    /// Queue `restore` like a dispatch. When it runs, the model it returns
    /// replaces the current one without running the transition, recording
    /// a step or scheduling effects. Watchers and views are still notified.
    fn restore(&self, restore: Restore<M>);
}

/// Deferred time-travel step: yields the model to show, or `None` to leave
/// the store as it is.
pub type Restore<M> = Box<dyn FnOnce() -> Option<Arc<M>> + Send>;

/// Hooks a store calls around every committed step.
pub trait Middleware<A, M>: Send + Sync + 'static {
    /// Whether this middleware observes anything at all.
    const ENABLED: bool;

    /// Data captured before a step and handed back to `record` after it.
    type Captured;

    /// Called once, right after the store is created.
    fn attach(&self, target: Weak<dyn DebugTarget<A, M>>, initial: &Arc<M>);

    /// Called before a step runs. `action` is `None` for direct writes.
    fn capture(&self, action: Option<&A>) -> Self::Captured;

    /// Called with the model a step produced, before it becomes visible.
    fn record(&self, captured: Self::Captured, model: &Arc<M>);

    /// Called whenever a new model becomes current, including restores.
    fn view(&self, model: &Arc<M>);
}

/// Middleware that does nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDebug;

impl<A: 'static, M: 'static> Middleware<A, M> for NoDebug {
    const ENABLED: bool = false;
    type Captured = ();

    #[inline(always)]
    fn attach(&self, _target: Weak<dyn DebugTarget<A, M>>, _initial: &Arc<M>) {}

    #[inline(always)]
    fn capture(&self, _action: Option<&A>) {}

    #[inline(always)]
    fn record(&self, _captured: (), _model: &Arc<M>) {}

    #[inline(always)]
    fn view(&self, _model: &Arc<M>) {}
}

/// Errors from debug operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebugError {
    #[error("history index {index} out of range (history has {len} entries)")]
    OutOfRange { index: usize, len: usize },

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("debug middleware is not attached to a live store")]
    Detached,
}
