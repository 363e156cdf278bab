//! Explicit flush point towards external sinks.
//!
//! Watchers registered through `watch` are the seam where UI bindings and
//! persistence collaborators observe the model. Transactional roots only
//! propagate to them when committed. Store roots propagate after every
//! dispatch; committing one is queued behind any dispatch in progress and
//! does nothing unless a change is pending.

/// Anything that can flush pending model changes to its watchers.
pub trait Commit {
    fn commit(&self);
}

/// Commit several roots in order.
pub fn commit(targets: &[&dyn Commit]) {
    for target in targets {
        target.commit();
    }
}

/// `commit!(state, file_name)` commits every argument in order.
#[macro_export]
macro_rules! commit {
    ($($target:expr),+ $(,)?) => {
        $crate::cursor::commit(&[$(&$target as &dyn $crate::cursor::Commit),+])
    };
}
