//! Scheduling seam for effects.
//!
//! The store never runs an effect inline: it posts one task per effect on an
//! [`EventLoop`] and returns. Implementations decide only *when* tasks run,
//! never in which order relative to the dispatches that produced them.
//!
//! - [`ManualEventLoop`]: tasks wait in a queue until the caller drains it.
//! - [`TokioEventLoop`]: tasks run on a driver task of a tokio runtime owned
//!   by the host application.

mod manual;
mod tokio_loop;

use thiserror::Error;

pub use manual::ManualEventLoop;
pub use tokio_loop::TokioEventLoop;

/// Unit of work scheduled on a loop. A returned error is reported to whoever
/// drives the loop.
pub type Task = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

/// Work that may take a while. It runs off the task sequence where the
/// loop allows it and yields the continuation to post once it completes.
pub type AsyncWork = Box<dyn FnOnce() -> Task + Send + 'static>;

pub trait EventLoop: Clone + Send + Sync + 'static {
    /// Schedule `task` to run later, after everything posted before it.
    fn post(&self, task: Task);

    /// Run `work`, then post the task it returns as a fresh task.
    fn post_async(&self, work: AsyncWork);
}

/// Errors surfaced to the caller driving a loop.
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("event loop task failed: {0:#}")]
    Task(anyhow::Error),

    #[error("event loop still busy after {steps} steps")]
    BudgetExceeded { steps: usize },
}
