use std::fmt;
use std::sync::OnceLock;

use super::DebugContext;

/// Frontend attached to a debug-enabled store.
///
/// `set_context` is called once when the store is created; `view` after
/// every model change, including rewinds.
pub trait Debugger<A, M>: Send + Sync + 'static {
    fn set_context(&self, context: DebugContext<A, M>);
    fn view(&self, model: &M);
}

/// Debugger that ignores everything. Stores built with it behave exactly
/// like stores without debugging, except that history is recorded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDebugger;

impl<A, M> Debugger<A, M> for NullDebugger {
    fn set_context(&self, _context: DebugContext<A, M>) {}
    fn view(&self, _model: &M) {}
}

/// Debugger that logs every model change through `tracing`.
pub struct TracingDebugger<A, M> {
    context: OnceLock<DebugContext<A, M>>,
}

impl<A, M> TracingDebugger<A, M> {
    pub fn new() -> Self {
        Self {
            context: OnceLock::new(),
        }
    }

    /// Context received from the store, once attached.
    pub fn context(&self) -> Option<&DebugContext<A, M>> {
        self.context.get()
    }
}

impl<A, M> Default for TracingDebugger<A, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, M> fmt::Debug for TracingDebugger<A, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingDebugger")
            .field("attached", &self.context.get().is_some())
            .finish()
    }
}

impl<A, M> Debugger<A, M> for TracingDebugger<A, M>
where
    A: Clone + Send + 'static,
    M: fmt::Debug + Send + Sync + 'static,
{
    fn set_context(&self, context: DebugContext<A, M>) {
        if self.context.set(context).is_err() {
            tracing::warn!("debugger already attached; ignoring new context");
        }
    }

    fn view(&self, model: &M) {
        let (position, entries) = self
            .context
            .get()
            .map(|context| (context.position(), context.len()))
            .unwrap_or_default();
        tracing::debug!(?position, entries, ?model, "model changed");
    }
}
