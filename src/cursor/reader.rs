use std::sync::Arc;

use super::{Commit, Root, Watch};
use crate::lens::Lens;

type Projection<M, V> = Arc<dyn Fn(&M) -> V + Send + Sync>;

/// Read-only view of a `V` derived from the model `M` of some root.
///
/// Unlike [`Cursor`](super::Cursor), a reader may be transformed with a
/// function that has no inverse, e.g. the length of a list.
pub struct Reader<M, V> {
    root: Arc<dyn Root<M>>,
    project: Projection<M, V>,
}

impl<M, V> Clone for Reader<M, V> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
            project: Arc::clone(&self.project),
        }
    }
}

impl<M, V> Reader<M, V>
where
    M: Send + Sync + 'static,
    V: 'static,
{
    pub(crate) fn new(root: Arc<dyn Root<M>>, project: Projection<M, V>) -> Self {
        Self { root, project }
    }

    pub fn get(&self) -> V {
        (self.project)(&self.root.snapshot())
    }

    pub fn map<W: 'static>(&self, f: impl Fn(V) -> W + Send + Sync + 'static) -> Reader<M, W> {
        let project = Arc::clone(&self.project);
        Reader::new(
            Arc::clone(&self.root),
            Arc::new(move |model: &M| f(project(model))),
        )
    }

    pub fn zoom<W: 'static>(&self, lens: Lens<V, W>) -> Reader<M, W> {
        self.map(move |value| lens.get(&value))
    }

    /// Call `callback` with the new value whenever a commit changes it.
    pub fn watch(&self, callback: impl Fn(&V) + Send + Sync + 'static) -> Watch
    where
        V: PartialEq,
    {
        let project = Arc::clone(&self.project);
        self.root
            .watchers()
            .subscribe(Arc::new(move |previous: &M, current: &M| {
                let next = project(current);
                if project(previous) != next {
                    callback(&next);
                }
            }))
    }
}

impl<M, V> Commit for Reader<M, V> {
    fn commit(&self) {
        self.root.commit();
    }
}
