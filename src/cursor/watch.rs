//! Change notification for cursor roots.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback<M> = Arc<dyn Fn(&M, &M) + Send + Sync>;

/// Callbacks registered on a root, invoked with `(previous, current)` each
/// time the root propagates a new committed model.
pub struct Watchers<M> {
    inner: Mutex<Registry<M>>,
}

struct Registry<M> {
    next_id: u64,
    entries: Vec<(u64, Callback<M>)>,
}

impl<M: 'static> Watchers<M> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            }),
        })
    }

    pub(crate) fn subscribe(self: &Arc<Self>, callback: Callback<M>) -> Watch {
        let mut registry = self.inner.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, callback));
        let weak = Arc::downgrade(self);
        let weak: Weak<dyn Unsubscribe> = weak;
        Watch {
            id,
            registry: Some(weak),
        }
    }

    /// Invoke every callback. The registry lock is released first so
    /// callbacks may write through cursors or register new watchers.
    pub(crate) fn notify(&self, previous: &M, current: &M) {
        let callbacks: Vec<Callback<M>> = self
            .inner
            .lock()
            .entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(previous, current);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: u64);
}

impl<M: 'static> Unsubscribe for Watchers<M> {
    fn unsubscribe(&self, id: u64) {
        self.inner.lock().entries.retain(|(entry, _)| *entry != id);
    }
}

/// Subscription handle returned by `watch`. Dropping it unregisters the
/// callback; [`Watch::detach`] keeps the callback for the root's lifetime.
#[must_use = "dropping a Watch unregisters its callback"]
pub struct Watch {
    id: u64,
    registry: Option<Weak<dyn Unsubscribe>>,
}

impl Watch {
    /// Keep the callback registered for as long as the root lives.
    ///
    /// The root owns the callback from then on. A callback that captures a
    /// cursor or reader on the same root forms a cycle and the root is
    /// never dropped; capture a [`WeakCursor`](super::WeakCursor) instead.
    pub fn detach(mut self) {
        self.registry = None;
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.take().and_then(|weak| weak.upgrade()) {
            registry.unsubscribe(self.id);
        }
    }
}

impl std::fmt::Debug for Watch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watch")
            .field("id", &self.id)
            .field("attached", &self.registry.is_some())
            .finish()
    }
}
