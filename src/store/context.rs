use std::fmt;
use std::sync::{Arc, Weak};

use crate::event_loop::{AsyncWork, Task};

use super::StoreError;

/// Store operations reachable from effects.
pub(crate) trait Dispatcher<A, M>: Send + Sync {
    fn dispatch(&self, action: A);
    fn current(&self) -> Arc<M>;
    fn post(&self, task: Task);
    fn post_async(&self, work: AsyncWork);
}

/// Capability handed to effects: dispatch actions, read the model and
/// schedule background work on the owning store.
///
/// Holds only a weak reference, so a context never keeps its store alive.
pub struct Context<A, M> {
    target: Weak<dyn Dispatcher<A, M>>,
}

impl<A, M> Context<A, M> {
    pub(crate) fn new(target: Weak<dyn Dispatcher<A, M>>) -> Self {
        Self { target }
    }

    fn upgrade(&self) -> Result<Arc<dyn Dispatcher<A, M>>, StoreError> {
        self.target.upgrade().ok_or(StoreError::Dropped)
    }

    /// Dispatch `action` on the owning store.
    ///
    /// When called from inside an effect that the store is already running,
    /// the action is queued and processed as soon as the current dispatch
    /// returns.
    pub fn dispatch(&self, action: A) -> Result<(), StoreError> {
        self.upgrade()?.dispatch(action);
        Ok(())
    }

    /// The store's current model.
    pub fn current(&self) -> Result<Arc<M>, StoreError> {
        Ok(self.upgrade()?.current())
    }

    /// Schedule `task` on the store's event loop, behind every effect
    /// already posted.
    pub fn post(&self, task: Task) -> Result<(), StoreError> {
        self.upgrade()?.post(task);
        Ok(())
    }

    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Run `producer` off the event loop, then post `completion` with its
    /// output back onto the loop. The completion is skipped if the store
    /// has been dropped in the meantime.
    pub fn spawn_async<T, P, C>(&self, producer: P, completion: C) -> Result<(), StoreError>
    where
        A: 'static,
        M: 'static,
        T: Send + 'static,
        P: FnOnce() -> T + Send + 'static,
        C: FnOnce(&Context<A, M>, T) -> anyhow::Result<()> + Send + 'static,
    {
        let target = self.upgrade()?;
        let context = self.clone();
        target.post_async(Box::new(move || -> Task {
            let output = producer();
            Box::new(move || {
                if !context.is_alive() {
                    tracing::debug!("store dropped; skipping async completion");
                    return Ok(());
                }
                completion(&context, output)
            })
        }));
        Ok(())
    }
}

impl<A, M> Clone for Context<A, M> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
        }
    }
}

impl<A, M> fmt::Debug for Context<A, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("alive", &self.is_alive())
            .finish()
    }
}
