use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use super::first::FirstError;
use crate::config::Config;
use crate::error::TaskError;
use crate::handlers::Handlers;
use crate::stream::{Callback, Stream};

/// [`Stream`] that captures its first failure (from either phase) and
/// cancels itself; callbacks still pending are skipped.
pub struct FailFastStream {
    inner: Stream,
    first: Arc<FirstError>,
    stopped: AtomicBool,
}

impl FailFastStream {
    pub(crate) fn from_parts(cfg: Config, parent: CancellationToken, handlers: Handlers) -> Self {
        let first = FirstError::new();
        let inner = Stream::from_parts(cfg, parent, first.wrap(handlers));
        first.bind(inner.canceller());

        Self {
            inner,
            first,
            stopped: AtomicBool::new(false),
        }
    }

    /// Submits a task; see [`Stream::go`].
    pub async fn go<F>(&self, task: F) -> bool
    where
        F: Future<Output = Result<Option<Callback>, TaskError>> + Send + 'static,
    {
        if self.is_stopped() {
            return false;
        }
        self.inner.go(task).await
    }

    /// Waits for the stream, then closes the error channel. Idempotent.
    pub async fn wait(&self) {
        if self
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        self.inner.wait().await;
        self.first.close();
    }

    /// Waits, then clears the captured failure and re-arms the stream.
    pub async fn reset(&self) {
        self.wait().await;
        self.inner.reset().await;
        self.first.reset();
        self.stopped.store(false, Ordering::Release);
    }

    /// Cancels the stream without waiting.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// The first failure, if any.
    pub fn error(&self) -> Option<Arc<TaskError>> {
        self.first.error()
    }

    /// Returns `true` once a failure was captured.
    pub fn has_error(&self) -> bool {
        self.first.error().is_some()
    }

    /// Channel yielding the first failure; closed without a value by
    /// [`wait`](Self::wait) if nothing failed. Available once per generation.
    pub fn take_error_channel(&self) -> Option<oneshot::Receiver<Arc<TaskError>>> {
        self.first.take_channel()
    }

    /// Returns `true` once [`wait`](Self::wait) has started (until [`reset`](Self::reset)).
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Token of the stream; cancelled by the first failure.
    pub fn token(&self) -> CancellationToken {
        self.inner.token()
    }

    /// Worker ceiling, `None` when unbounded.
    pub fn max_concurrent(&self) -> Option<usize> {
        self.inner.max_concurrent()
    }
}
