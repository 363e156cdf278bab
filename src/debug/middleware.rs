use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;

use crate::config::DebugConfig;

use super::{DebugContext, DebugTarget, Debugger, Entry, History, Middleware, Step};

/// Middleware recording every committed step for a [`Debugger`].
pub struct DebugMiddleware<A, M, G> {
    debugger: G,
    history: Arc<Mutex<History<A, M>>>,
    target: OnceLock<Weak<dyn DebugTarget<A, M>>>,
}

/// Debug middleware with unbounded history.
pub fn enable_debug<A, M, G>(debugger: G) -> DebugMiddleware<A, M, G>
where
    G: Debugger<A, M>,
{
    DebugMiddleware::new(debugger, None)
}

/// Debug middleware sized from configuration.
pub fn enable_debug_with<A, M, G>(debugger: G, config: &DebugConfig) -> DebugMiddleware<A, M, G>
where
    G: Debugger<A, M>,
{
    DebugMiddleware::new(debugger, config.history_capacity)
}

impl<A, M, G> DebugMiddleware<A, M, G> {
    pub fn new(debugger: G, capacity: Option<usize>) -> Self {
        Self {
            debugger,
            history: Arc::new(Mutex::new(History::new(capacity))),
            target: OnceLock::new(),
        }
    }

    pub fn debugger(&self) -> &G {
        &self.debugger
    }
}

impl<A: Clone, M, G> DebugMiddleware<A, M, G> {
    /// Context bound to the store this middleware is attached to.
    pub fn context(&self) -> DebugContext<A, M> {
        DebugContext::new(Arc::clone(&self.history), self.target.get().cloned())
    }
}

impl<A, M, G> fmt::Debug for DebugMiddleware<A, M, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugMiddleware")
            .field("history", &*self.history.lock())
            .field("attached", &self.target.get().is_some())
            .finish()
    }
}

impl<A, M, G> Middleware<A, M> for DebugMiddleware<A, M, G>
where
    A: Clone + Send + 'static,
    M: Send + Sync + 'static,
    G: Debugger<A, M>,
{
    const ENABLED: bool = true;
    type Captured = Step<A>;

    fn attach(&self, target: Weak<dyn DebugTarget<A, M>>, initial: &Arc<M>) {
        if self.target.set(target).is_err() {
            tracing::warn!("debug middleware attached twice; keeping first store");
            return;
        }
        self.history.lock().reset(Arc::clone(initial));
        tracing::debug!(capacity = ?self.history.lock().capacity(), "debug middleware attached");
        self.debugger.set_context(self.context());
    }

    fn capture(&self, action: Option<&A>) -> Step<A> {
        match action {
            Some(action) => Step::Action(action.clone()),
            None => Step::Write,
        }
    }

    fn record(&self, step: Step<A>, model: &Arc<M>) {
        self.history.lock().push(Entry {
            step,
            model: Arc::clone(model),
        });
    }

    fn view(&self, model: &Arc<M>) {
        self.debugger.view(model.as_ref());
    }
}
