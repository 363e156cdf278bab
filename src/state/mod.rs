//! Standalone state container.
//!
//! Holds one immutable model value. Reads are lock-free snapshots; writes
//! are serialized so that `update` applies as a single indivisible step.
//! Field-level changes go through cursors derived from the container.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::{Mutex, ReentrantMutex};

use crate::cursor::{Commit, Cursor, Reader, Root, Watchers, Write};
use crate::lens::Lens;

/// When watchers of a [`State`] observe writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Every write is propagated immediately.
    Automatic,
    /// Writes are visible through `get` right away but only reach watchers
    /// on `commit`.
    Transactional,
}

/// Shared handle to a model value. Clones refer to the same container.
pub struct State<M> {
    inner: Arc<StateInner<M>>,
}

struct StateInner<M> {
    current: ArcSwap<M>,
    committed: ReentrantMutex<RefCell<Arc<M>>>,
    writer: Mutex<()>,
    propagation: Propagation,
    watchers: Arc<Watchers<M>>,
}

impl<M> Clone for State<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: fmt::Debug> fmt::Debug for State<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("current", &*self.inner.current.load_full())
            .field("propagation", &self.inner.propagation)
            .finish()
    }
}

impl<M> State<M>
where
    M: Clone + Send + Sync + 'static,
{
    pub fn new(initial: M, propagation: Propagation) -> Self {
        let initial = Arc::new(initial);
        Self {
            inner: Arc::new(StateInner {
                current: ArcSwap::new(Arc::clone(&initial)),
                committed: ReentrantMutex::new(RefCell::new(initial)),
                writer: Mutex::new(()),
                propagation,
                watchers: Watchers::new(),
            }),
        }
    }

    pub fn automatic(initial: M) -> Self {
        Self::new(initial, Propagation::Automatic)
    }

    pub fn transactional(initial: M) -> Self {
        Self::new(initial, Propagation::Transactional)
    }

    /// Current snapshot.
    pub fn get(&self) -> Arc<M> {
        self.inner.current.load_full()
    }

    pub fn set(&self, model: M) {
        self.update(move |_| model);
    }

    /// Replace the model with `f(current)`. Concurrent updates on the same
    /// container are applied one after the other, never interleaved.
    pub fn update(&self, f: impl FnOnce(&M) -> M) {
        self.inner.apply(f);
    }

    pub fn propagation(&self) -> Propagation {
        self.inner.propagation
    }

    pub fn cursor(&self) -> Cursor<M, M> {
        self.zoom(Lens::identity())
    }

    pub fn zoom<V: 'static>(&self, lens: Lens<M, V>) -> Cursor<M, V> {
        Cursor::new(self.root(), lens)
    }

    pub fn reader(&self) -> Reader<M, M> {
        Reader::new(self.root(), Arc::new(M::clone))
    }

    fn root(&self) -> Arc<dyn Root<M>> {
        Arc::clone(&self.inner) as Arc<dyn Root<M>>
    }
}

impl<M> StateInner<M>
where
    M: Send + Sync + 'static,
{
    fn apply(&self, f: impl FnOnce(&M) -> M) {
        {
            let _writer = self.writer.lock();
            let current = self.current.load_full();
            self.current.store(Arc::new(f(current.as_ref())));
        }
        if self.propagation == Propagation::Automatic {
            self.propagate();
        }
    }

    /// Holds the committed lock across notification so propagations from
    /// different threads reach watchers one at a time, in commit order. The
    /// lock is reentrant: a watcher writing through a cursor propagates
    /// its own write before the outer notification continues.
    fn propagate(&self) {
        let committed = self.committed.lock();
        let current = self.current.load_full();
        let previous = {
            let mut slot = committed.borrow_mut();
            if Arc::ptr_eq(&slot, &current) {
                return;
            }
            std::mem::replace(&mut *slot, Arc::clone(&current))
        };
        self.watchers.notify(&previous, &current);
    }
}

impl<M> Root<M> for StateInner<M>
where
    M: Send + Sync + 'static,
{
    fn snapshot(&self) -> Arc<M> {
        self.current.load_full()
    }

    fn write(&self, write: Write<M>) {
        self.apply(write);
    }

    fn watchers(&self) -> &Arc<Watchers<M>> {
        &self.watchers
    }

    fn commit(&self) {
        self.propagate();
    }
}

impl<M: Send + Sync + 'static> Commit for State<M> {
    fn commit(&self) {
        self.inner.propagate();
    }
}
