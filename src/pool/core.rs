use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use super::builder::PoolBuilder;
use super::worker::{Generation, Job};
use crate::config::Config;
use crate::error::TaskError;
use crate::handlers::Handlers;

/// Bounded, lazily-grown worker pool.
pub struct Pool {
    cfg: Config,
    parent: CancellationToken,
    handlers: Handlers,
    state: Arc<RwLock<Arc<Generation>>>,
    stopped: AtomicBool,
}

impl Pool {
    /// Creates a pool with default handlers and a fresh root token.
    pub fn new(cfg: Config) -> Self {
        PoolBuilder::new(cfg).build()
    }

    /// Starts a [`PoolBuilder`].
    pub fn builder(cfg: Config) -> PoolBuilder {
        PoolBuilder::new(cfg)
    }

    pub(crate) fn from_parts(cfg: Config, parent: CancellationToken, handlers: Handlers) -> Self {
        let generation = Generation::new(&parent, cfg.concurrency_limit(), handlers.clone());
        Self {
            cfg,
            parent,
            handlers,
            state: Arc::new(RwLock::new(generation)),
            stopped: AtomicBool::new(false),
        }
    }

    fn current(&self) -> Arc<Generation> {
        Arc::clone(&self.state.read())
    }

    /// Submits a task.
    ///
    /// Returns `false` (and drops the task) if the pool is cancelled or
    /// stopped, including when cancellation happens while waiting for room.
    /// Otherwise the task is guaranteed to run before [`wait`](Self::wait)
    /// returns.
    ///
    /// Suspends while the pool is at its ceiling and the queue is full.
    pub async fn go<F>(&self, task: F) -> bool
    where
        F: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let generation = self.current();
        if generation.token.is_cancelled() {
            return false;
        }
        let Some(tx) = generation.sender() else {
            return false;
        };
        let mut job: Job = Box::pin(task);

        if generation.idle() > 0 {
            match tx.try_send(job) {
                Ok(()) => return true,
                Err(TrySendError::Full(back)) | Err(TrySendError::Closed(back)) => job = back,
            }
        }

        // Always succeeds when unbounded.
        if let Some(permit) = generation.limiter.try_acquire() {
            generation.spawn_worker(job, permit);
            return true;
        }

        tokio::select! {
            biased;
            _ = generation.token.cancelled() => false,
            Some(permit) = generation.limiter.acquire() => {
                generation.spawn_worker(job, permit);
                true
            }
            slot = tx.reserve() => match slot {
                Ok(slot) => {
                    slot.send(job);
                    true
                }
                Err(_) => false,
            },
        }
    }

    /// Stops admission, runs every accepted task to completion and joins all workers.
    ///
    /// Only the first call does the work; later calls return immediately.
    pub async fn wait(&self) {
        if self
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        let generation = self.current();
        generation.shutdown().await;
        tracing::debug!("pool stopped");
    }

    /// Waits, then re-arms the pool with a fresh queue, limiter and token
    /// derived from the original parent.
    pub async fn reset(&self) {
        self.wait().await;
        let generation = Generation::new(
            &self.parent,
            self.cfg.concurrency_limit(),
            self.handlers.clone(),
        );
        *self.state.write() = generation;
        self.stopped.store(false, Ordering::Release);
        tracing::debug!("pool reset");
    }

    /// Cancels the pool's token without waiting; later `go` calls return `false`.
    pub fn cancel(&self) {
        self.current().token.cancel();
    }

    /// Token of the current generation; tasks may observe it to stop early.
    pub fn token(&self) -> CancellationToken {
        self.current().token.clone()
    }

    /// Returns `true` once [`wait`](Self::wait) has started (until [`reset`](Self::reset)).
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Returns `true` if the current generation's token is cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.current().token.is_cancelled()
    }

    /// Worker ceiling, `None` when unbounded.
    pub fn max_concurrent(&self) -> Option<usize> {
        self.cfg.concurrency_limit()
    }

    /// Closure cancelling whichever generation is current when it runs.
    ///
    /// Holds the pool state weakly: handlers capturing it must not keep the pool alive.
    pub(crate) fn canceller(&self) -> impl Fn() + Send + Sync + use<> {
        let state = Arc::downgrade(&self.state);
        move || {
            if let Some(state) = state.upgrade() {
                state.read().token.cancel();
            }
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        let generation = self.state.read();
        generation.token.cancel();
        generation.close_queue();
    }
}
