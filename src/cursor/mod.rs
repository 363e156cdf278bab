//! Cursors: composable read/write views into a model owned elsewhere.
//!
//! A cursor never holds a copy of the data. It is a root handle (a
//! [`State`](crate::state::State) or a [`Store`](crate::store::Store)) plus a
//! [`Lens`]. Reads resolve against the root's current model at read time;
//! writes rebuild the whole model through the lens and hand it to the root's
//! update path, so a write on a store-backed cursor is serialized with
//! dispatches and recorded by the debug layer like any other step.

mod commit;
mod reader;
mod watch;

use std::fmt;
use std::sync::{Arc, Weak};

use crate::lens::{self, Lens};
use crate::model::Vector;

pub use commit::{commit, Commit};
pub use reader::Reader;
pub use watch::{Watch, Watchers};

/// Boxed model rewrite submitted by cursors.
pub type Write<M> = Box<dyn FnOnce(&M) -> M + Send>;

/// Owner of a model that cursors can be derived from.
pub trait Root<M>: Send + Sync {
    /// Current model snapshot.
    fn snapshot(&self) -> Arc<M>;

    /// Replace the model with `write(current)` as one indivisible step.
    fn write(&self, write: Write<M>);

    /// Watchers notified when a new model is committed.
    fn watchers(&self) -> &Arc<Watchers<M>>;

    /// Propagate the current model to watchers if it changed since the last
    /// propagation.
    fn commit(&self);
}

/// Bidirectional view of a `V` inside the model `M` of some root.
pub struct Cursor<M, V> {
    root: Arc<dyn Root<M>>,
    lens: Lens<M, V>,
}

impl<M, V> Clone for Cursor<M, V> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
            lens: self.lens.clone(),
        }
    }
}

impl<M, V> fmt::Debug for Cursor<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("lens", &self.lens).finish()
    }
}

impl<M, V> Cursor<M, V>
where
    M: Clone + Send + Sync + 'static,
    V: 'static,
{
    pub(crate) fn new(root: Arc<dyn Root<M>>, lens: Lens<M, V>) -> Self {
        Self { root, lens }
    }

    pub fn get(&self) -> V {
        self.lens.get(&self.root.snapshot())
    }

    pub fn set(&self, value: V)
    where
        V: Send,
    {
        let lens = self.lens.clone();
        self.root
            .write(Box::new(move |model: &M| lens.set(model.clone(), value)));
    }

    /// Replace the focused value with `f(current)`, evaluated against the
    /// model at the time the write is applied.
    pub fn update(&self, f: impl FnOnce(V) -> V + Send + 'static) {
        let lens = self.lens.clone();
        self.root
            .write(Box::new(move |model: &M| lens.over(model.clone(), f)));
    }

    /// Derive a child cursor focused through `lens`.
    pub fn zoom<W: 'static>(&self, lens: Lens<V, W>) -> Cursor<M, W> {
        Cursor::new(Arc::clone(&self.root), self.lens.then(lens))
    }

    /// Attach a representation transform. `to_internal` must invert
    /// `to_external` for every value written through the result.
    pub fn map<W: 'static>(
        &self,
        to_external: impl Fn(V) -> W + Send + Sync + 'static,
        to_internal: impl Fn(W) -> V + Send + Sync + 'static,
    ) -> Cursor<M, W>
    where
        V: Clone,
    {
        Cursor::new(
            Arc::clone(&self.root),
            self.lens.map(to_external, to_internal),
        )
    }

    pub fn reader(&self) -> Reader<M, V> {
        let lens = self.lens.clone();
        Reader::new(
            Arc::clone(&self.root),
            Arc::new(move |model: &M| lens.get(model)),
        )
    }

    /// Call `callback` with the new value whenever a commit changes it.
    pub fn watch(&self, callback: impl Fn(&V) + Send + Sync + 'static) -> Watch
    where
        V: PartialEq,
    {
        self.reader().watch(callback)
    }

    pub fn lens(&self) -> &Lens<M, V> {
        &self.lens
    }

    /// Handle that does not keep the root alive.
    pub fn downgrade(&self) -> WeakCursor<M, V> {
        WeakCursor {
            root: Arc::downgrade(&self.root),
            lens: self.lens.clone(),
        }
    }
}

/// Cursor that does not own its root, obtained from [`Cursor::downgrade`].
///
/// Watcher callbacks are owned by their root, so a detached callback that
/// captures a [`Cursor`] on the same root keeps it alive forever. Capture a
/// `WeakCursor` there instead.
pub struct WeakCursor<M, V> {
    root: Weak<dyn Root<M>>,
    lens: Lens<M, V>,
}

impl<M, V> Clone for WeakCursor<M, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            lens: self.lens.clone(),
        }
    }
}

impl<M, V> fmt::Debug for WeakCursor<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakCursor")
            .field("lens", &self.lens)
            .field("alive", &(self.root.strong_count() > 0))
            .finish()
    }
}

impl<M, V> WeakCursor<M, V>
where
    M: Clone + Send + Sync + 'static,
    V: 'static,
{
    /// The cursor, or `None` once the root has been dropped.
    pub fn upgrade(&self) -> Option<Cursor<M, V>> {
        let root = self.root.upgrade()?;
        Some(Cursor::new(root, self.lens.clone()))
    }
}

impl<M, T> Cursor<M, Vector<T>>
where
    M: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Cursor over element `index`; reads `None` when it does not exist.
    pub fn at(&self, index: usize) -> Cursor<M, Option<T>> {
        self.zoom(lens::at(index))
    }
}

impl<M, V> Commit for Cursor<M, V> {
    fn commit(&self) {
        self.root.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Entry {
        done: bool,
        text: String,
    }

    #[test]
    fn cursor_write_replaces_root_model() {
        let state = State::automatic(Entry::default());
        let done = state.zoom(crate::lens!(Entry, done));
        let before = state.get();
        done.set(true);
        assert!(state.get().done);
        assert!(!before.done);
    }

    #[test]
    fn update_reads_latest_value() {
        let state = State::automatic(Entry::default());
        let text = state.zoom(crate::lens!(Entry, text));
        text.update(|t| t + "a");
        text.update(|t| t + "b");
        assert_eq!(text.get(), "ab");
    }

    #[test]
    fn weak_cursor_follows_root_lifetime() {
        let state = State::automatic(Entry::default());
        let weak = state.zoom(crate::lens!(Entry, done)).downgrade();

        weak.upgrade().unwrap().set(true);
        assert!(state.get().done);

        drop(state);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn at_focuses_vector_elements() {
        let state = State::automatic(Vector::from(vec![1, 2, 3]));
        let cursor = state.cursor().at(2);
        cursor.set(Some(30));
        assert_eq!(state.get().get(2), Some(&30));
        assert_eq!(state.cursor().at(7).get(), None);
    }
}
