use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::{AsyncWork, EventLoop, Task};

type ErrorHook = Arc<dyn Fn(anyhow::Error) + Send + Sync>;

/// Host-integrated loop backed by a tokio runtime.
///
/// Tasks go through a channel to a single driver task, which runs them one
/// per iteration in posting order and yields to the runtime in between.
/// Async work runs on the blocking pool; its continuation is posted to the
/// driver like any other task.
#[derive(Clone)]
pub struct TokioEventLoop {
    sender: mpsc::UnboundedSender<Task>,
    handle: Handle,
}

impl TokioEventLoop {
    /// Spawn the driver on `handle`. Task failures are logged.
    pub fn new(handle: Handle) -> Self {
        Self::with_error_handler(handle, |err| {
            tracing::error!(error = %format!("{err:#}"), "event loop task failed");
        })
    }

    /// Spawn the driver on the runtime of the calling context.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Spawn the driver on `handle`, reporting task failures to `on_error`.
    /// A panicking task is reported as a failure and the driver keeps going.
    pub fn with_error_handler(
        handle: Handle,
        on_error: impl Fn(anyhow::Error) + Send + Sync + 'static,
    ) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Task>();
        let on_error: ErrorHook = Arc::new(on_error);
        handle.spawn(async move {
            while let Some(task) = receiver.recv().await {
                let outcome = panic::catch_unwind(AssertUnwindSafe(task)).unwrap_or_else(|payload| {
                    let message = panic_message(&*payload);
                    Err(anyhow::anyhow!("event loop task panicked: {message}"))
                });
                if let Err(err) = outcome {
                    on_error(err);
                }
                tokio::task::yield_now().await;
            }
            tracing::debug!("event loop driver stopped");
        });
        Self { sender, handle }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

impl EventLoop for TokioEventLoop {
    fn post(&self, task: Task) {
        if self.sender.send(task).is_err() {
            tracing::debug!("event loop driver gone; task dropped");
        }
    }

    fn post_async(&self, work: AsyncWork) {
        let sender = self.sender.clone();
        self.handle.spawn(async move {
            let continuation: Task = match tokio::task::spawn_blocking(work).await {
                Ok(continuation) => continuation,
                Err(join) => Box::new(move || Err(anyhow::anyhow!("async work failed: {join}"))),
            };
            if sender.send(continuation).is_err() {
                tracing::debug!("event loop driver gone; continuation dropped");
            }
        });
    }
}

impl std::fmt::Debug for TokioEventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioEventLoop")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn runs_tasks_in_post_order() {
        let event_loop = TokioEventLoop::current();
        let log = Arc::new(Mutex::new(Vec::new()));
        for n in 0..5 {
            let log = Arc::clone(&log);
            event_loop.post(Box::new(move || {
                log.lock().push(n);
                Ok(())
            }));
        }
        let (done_tx, done_rx) = oneshot::channel();
        event_loop.post(Box::new(move || {
            let _ = done_tx.send(());
            Ok(())
        }));
        done_rx.await.unwrap();
        assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn failures_reach_error_hook() {
        let (err_tx, err_rx) = oneshot::channel();
        let err_tx = Mutex::new(Some(err_tx));
        let event_loop = TokioEventLoop::with_error_handler(Handle::current(), move |err| {
            if let Some(tx) = err_tx.lock().take() {
                let _ = tx.send(err.to_string());
            }
        });
        event_loop.post(Box::new(|| Err(anyhow::anyhow!("effect exploded"))));
        assert_eq!(err_rx.await.unwrap(), "effect exploded");
    }

    #[test]
    fn panic_message_reads_str_and_string() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&7u8), "non-string panic payload");
    }

    #[tokio::test]
    async fn async_work_posts_continuation() {
        let event_loop = TokioEventLoop::current();
        let (tx, rx) = oneshot::channel();
        event_loop.post_async(Box::new(move || -> Task {
            let value = (1..=10).sum::<u32>();
            Box::new(move || {
                let _ = tx.send(value);
                Ok(())
            })
        }));
        assert_eq!(rx.await.unwrap(), 55);
    }
}
