use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;

use super::{DebugError, DebugTarget, Entry, History, Travel};

/// Handle a [`Debugger`](super::Debugger) uses to inspect and steer a store.
pub struct DebugContext<A, M> {
    history: Arc<Mutex<History<A, M>>>,
    target: Option<Weak<dyn DebugTarget<A, M>>>,
}

impl<A, M> Clone for DebugContext<A, M> {
    fn clone(&self) -> Self {
        Self {
            history: Arc::clone(&self.history),
            target: self.target.clone(),
        }
    }
}

impl<A, M> fmt::Debug for DebugContext<A, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugContext")
            .field("history", &*self.history.lock())
            .finish()
    }
}

impl<A, M> DebugContext<A, M> {
    pub(crate) fn new(
        history: Arc<Mutex<History<A, M>>>,
        target: Option<Weak<dyn DebugTarget<A, M>>>,
    ) -> Self {
        Self { history, target }
    }

    fn target(&self) -> Result<Arc<dyn DebugTarget<A, M>>, DebugError> {
        self.target
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or(DebugError::Detached)
    }
}

impl<A, M> DebugContext<A, M>
where
    A: Clone,
{
    /// Dispatch `action` as if the application had sent it.
    pub fn dispatch(&self, action: A) -> Result<(), DebugError> {
        self.target()?.dispatch(action);
        Ok(())
    }

    pub fn current(&self) -> Result<Arc<M>, DebugError> {
        Ok(self.target()?.current())
    }

    /// Drop the recorded history, keeping the current model as the base.
    pub fn reset(&self) -> Result<(), DebugError> {
        let target = self.target()?;
        let current = target.current();
        self.history.lock().reset(current);
        tracing::info!("debug history reset");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }

    pub fn position(&self) -> Option<usize> {
        self.history.lock().position()
    }

    /// Copy of every recorded entry, oldest first.
    pub fn history(&self) -> Vec<Entry<A, M>> {
        self.history.lock().entries().cloned().collect()
    }

    pub fn model_at(&self, index: usize) -> Option<Arc<M>> {
        self.history
            .lock()
            .get(index)
            .map(|entry| Arc::clone(&entry.model))
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value>
    where
        A: Serialize,
        M: Serialize,
    {
        self.history.lock().to_json()
    }
}

impl<A, M> DebugContext<A, M>
where
    A: Send + 'static,
    M: Send + Sync + 'static,
{
    /// Make the model recorded at `index` current again.
    ///
    /// The step is not recorded and no effects run. The next dispatch
    /// discards every entry after `index`. Called from a view or a debugger
    /// while the store is dispatching, the rewind is queued behind the
    /// pending dispatches and applied after them.
    pub fn rewind(&self, index: usize) -> Result<(), DebugError> {
        self.travel(Travel::To(index))
    }

    pub fn undo(&self) -> Result<(), DebugError> {
        self.travel(Travel::Back)
    }

    pub fn redo(&self) -> Result<(), DebugError> {
        self.travel(Travel::Forward)
    }

    /// Errors are reported against the history as it is now. The position
    /// moves when the store processes the restore, together with the model.
    fn travel(&self, travel: Travel) -> Result<(), DebugError> {
        let target = self.target()?;
        self.history.lock().resolve(travel)?;
        let history = Arc::clone(&self.history);
        target.restore(Box::new(move || match history.lock().travel(travel) {
            Ok(model) => {
                tracing::info!(?travel, "time travel");
                Some(model)
            }
            Err(err) => {
                tracing::warn!(
                    ?travel,
                    error = %err,
                    "history changed before time travel ran; skipped"
                );
                None
            }
        }));
        Ok(())
    }
}
