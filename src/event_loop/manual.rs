use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::{AsyncWork, EventLoop, LoopError, Task};
use crate::config::EventLoopConfig;

/// Deterministic loop: nothing runs until the caller steps or drains it.
///
/// Clones share one queue, so a clone handed to a store can be drained from
/// the test or host that created it.
#[derive(Clone)]
pub struct ManualEventLoop {
    inner: Arc<ManualInner>,
}

struct ManualInner {
    queue: Mutex<VecDeque<Task>>,
    max_steps: usize,
}

impl ManualEventLoop {
    pub fn new() -> Self {
        Self::from_config(&EventLoopConfig::default())
    }

    pub fn from_config(config: &EventLoopConfig) -> Self {
        Self {
            inner: Arc::new(ManualInner {
                queue: Mutex::new(VecDeque::new()),
                max_steps: config.max_drain_steps,
            }),
        }
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.inner.queue.lock().len()
    }

    /// Run the oldest queued task. Returns `Ok(false)` when the queue was
    /// empty. A failing task is consumed and its error returned.
    pub fn step(&self) -> Result<bool, LoopError> {
        let Some(task) = self.inner.queue.lock().pop_front() else {
            return Ok(false);
        };
        task().map_err(LoopError::Task)?;
        Ok(true)
    }

    /// Run tasks in FIFO order until the queue is empty, including tasks
    /// posted while draining. Stops at the first failure and leaves the
    /// remaining tasks queued. Returns the number of tasks run.
    pub fn drain(&self) -> Result<usize, LoopError> {
        let mut steps = 0;
        while self.step()? {
            steps += 1;
            if steps >= self.inner.max_steps && self.pending() > 0 {
                tracing::warn!(steps, pending = self.pending(), "manual event loop drain budget exhausted");
                return Err(LoopError::BudgetExceeded { steps });
            }
        }
        Ok(steps)
    }

    fn downgrade(&self) -> Weak<ManualInner> {
        Arc::downgrade(&self.inner)
    }
}

impl Default for ManualEventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop for ManualEventLoop {
    fn post(&self, task: Task) {
        self.inner.queue.lock().push_back(task);
    }

    /// Work runs when its turn comes during a drain; the continuation is
    /// queued behind whatever was posted meanwhile.
    fn post_async(&self, work: AsyncWork) {
        let queue = self.downgrade();
        self.post(Box::new(move || {
            let continuation = work();
            if let Some(inner) = queue.upgrade() {
                inner.queue.lock().push_back(continuation);
            }
            Ok(())
        }));
    }
}

impl std::fmt::Debug for ManualEventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualEventLoop")
            .field("pending", &self.pending())
            .field("max_steps", &self.inner.max_steps)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Task) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |n: u32| -> Task {
            let sink = Arc::clone(&sink);
            Box::new(move || {
                sink.lock().push(n);
                Ok(())
            })
        };
        (log, make)
    }

    #[test]
    fn nothing_runs_until_drained() {
        let event_loop = ManualEventLoop::new();
        let (log, task) = recorder();
        event_loop.post(task(1));
        event_loop.post(task(2));
        assert!(log.lock().is_empty());
        assert_eq!(event_loop.pending(), 2);
        assert_eq!(event_loop.drain().unwrap(), 2);
        assert_eq!(*log.lock(), vec![1, 2]);
        assert_eq!(event_loop.drain().unwrap(), 0);
    }

    #[test]
    fn step_runs_one_task() {
        let event_loop = ManualEventLoop::new();
        let (log, task) = recorder();
        event_loop.post(task(1));
        event_loop.post(task(2));
        assert!(event_loop.step().unwrap());
        assert_eq!(*log.lock(), vec![1]);
        assert_eq!(event_loop.pending(), 1);
    }

    #[test]
    fn failure_stops_drain_and_keeps_rest() {
        let event_loop = ManualEventLoop::new();
        let (log, task) = recorder();
        event_loop.post(task(1));
        event_loop.post(Box::new(|| Err(anyhow::anyhow!("boom"))));
        event_loop.post(task(3));
        let err = event_loop.drain().unwrap_err();
        assert!(matches!(err, LoopError::Task(_)));
        assert!(err.to_string().contains("boom"));
        assert_eq!(*log.lock(), vec![1]);
        assert_eq!(event_loop.drain().unwrap(), 1);
        assert_eq!(*log.lock(), vec![1, 3]);
    }

    #[test]
    fn async_continuation_is_a_fresh_task() {
        let event_loop = ManualEventLoop::new();
        let (log, task) = recorder();
        let continuation = task(10);
        event_loop.post_async(Box::new(move || continuation));
        event_loop.post(task(2));
        assert_eq!(event_loop.drain().unwrap(), 3);
        assert_eq!(*log.lock(), vec![2, 10]);
    }

    #[test]
    fn budget_stops_runaway_chains() {
        let event_loop = ManualEventLoop::from_config(&EventLoopConfig { max_drain_steps: 5 });
        fn repost(event_loop: ManualEventLoop) -> Task {
            Box::new(move || {
                event_loop.post(repost(event_loop.clone()));
                Ok(())
            })
        }
        event_loop.post(repost(event_loop.clone()));
        assert!(matches!(
            event_loop.drain(),
            Err(LoopError::BudgetExceeded { steps: 5 })
        ));
    }
}
