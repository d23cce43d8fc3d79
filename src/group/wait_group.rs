use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::handlers::{PanicHandler, log_panic};
use crate::panics::{catch, catch_blocking};

/// Panic-safe launcher that joins every task it started.
///
/// Cloning yields a handle to the same group.
#[derive(Clone)]
pub struct WaitGroup {
    running: Arc<watch::Sender<usize>>,
    on_panic: PanicHandler,
}

/// Decrements the running count when the task exits, however it exits.
struct Running(Arc<watch::Sender<usize>>);

impl Running {
    fn enter(running: &Arc<watch::Sender<usize>>) -> Self {
        running.send_modify(|n| *n += 1);
        Self(Arc::clone(running))
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

impl WaitGroup {
    /// Creates a group whose panics are logged with [`log_panic`].
    pub fn new() -> Self {
        Self::with_panic_handler(Arc::new(log_panic))
    }

    /// Creates a group that routes panics to `handler`.
    pub fn with_panic_handler(handler: PanicHandler) -> Self {
        let (tx, _) = watch::channel(0usize);
        Self {
            running: Arc::new(tx),
            on_panic: handler,
        }
    }

    /// Spawns `fut` on the current runtime and tracks it.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn go<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = Running::enter(&self.running);
        let on_panic = Arc::clone(&self.on_panic);

        tokio::spawn(async move {
            let _guard = guard;
            if let Err(recovered) = catch(fut).await {
                on_panic(recovered);
            }
        });
    }

    /// Runs `f` on the blocking thread pool and tracks it.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn go_blocking<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let guard = Running::enter(&self.running);
        let on_panic = Arc::clone(&self.on_panic);

        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            if let Err(recovered) = catch_blocking(f) {
                on_panic(recovered);
            }
        });
    }

    /// Waits until every started task has exited.
    ///
    /// Tasks started while waiting are waited for too.
    pub async fn wait(&self) {
        let mut rx = self.running.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Number of tasks still running.
    pub fn len(&self) -> usize {
        *self.running.borrow()
    }

    /// Returns `true` when no task is running.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for WaitGroup {
    fn default() -> Self {
        Self::new()
    }
}
