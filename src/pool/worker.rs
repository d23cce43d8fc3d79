//! One pool generation: task queue, limiter, token and its workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::limiter::{Limiter, Permit};
use crate::error::TaskError;
use crate::group::WaitGroup;
use crate::handlers::Handlers;
use crate::panics::catch;

/// A submitted pool task.
pub(crate) type Job = BoxFuture<'static, Result<(), TaskError>>;

pub(crate) struct Generation {
    pub(crate) token: CancellationToken,
    pub(crate) limiter: Limiter,
    pub(crate) handlers: Handlers,
    tx: Mutex<Option<mpsc::Sender<Job>>>,
    rx: tokio::sync::Mutex<mpsc::Receiver<Job>>,
    /// Workers parked on the queue.
    idle: AtomicUsize,
    workers: WaitGroup,
}

impl Generation {
    pub(crate) fn new(
        parent: &CancellationToken,
        limit: Option<usize>,
        handlers: Handlers,
    ) -> Arc<Self> {
        let limiter = Limiter::new(limit);
        let (tx, rx) = mpsc::channel(limiter.limit().unwrap_or(1).max(1));

        Arc::new(Self {
            token: parent.child_token(),
            workers: WaitGroup::with_panic_handler(Arc::clone(&handlers.panic)),
            limiter,
            handlers,
            tx: Mutex::new(Some(tx)),
            rx: tokio::sync::Mutex::new(rx),
            idle: AtomicUsize::new(0),
        })
    }

    /// Sender clone, `None` once the queue is closed.
    pub(crate) fn sender(&self) -> Option<mpsc::Sender<Job>> {
        self.tx.lock().clone()
    }

    pub(crate) fn idle(&self) -> usize {
        self.idle.load(Ordering::Acquire)
    }

    /// Workers spawned and not yet exited.
    #[cfg(test)]
    pub(crate) fn live(&self) -> usize {
        self.workers.len()
    }

    /// Drops the queue's sender; workers exit once the queue is drained.
    pub(crate) fn close_queue(&self) {
        self.tx.lock().take();
    }

    pub(crate) fn spawn_worker(self: &Arc<Self>, first: Job, permit: Permit) {
        let generation = Arc::clone(self);
        self.workers.go(generation.work(first, permit));
    }

    /// Cancels admission, drains the queue, joins workers, closes the limiter.
    pub(crate) async fn shutdown(&self) {
        self.token.cancel();
        self.close_queue();
        self.workers.wait().await;
        self.limiter.close();
    }

    async fn work(self: Arc<Self>, first: Job, permit: Permit) {
        tracing::trace!(live = self.workers.len(), "pool worker started");
        self.run(first).await;

        loop {
            self.idle.fetch_add(1, Ordering::AcqRel);
            let next = {
                let mut rx = self.rx.lock().await;
                rx.recv().await
            };
            self.idle.fetch_sub(1, Ordering::AcqRel);

            match next {
                Some(job) => self.run(job).await,
                None => break,
            }
        }

        drop(permit);
        tracing::trace!("pool worker exited");
    }

    async fn run(&self, job: Job) {
        let handlers = &self.handlers;
        let outcome = catch(async move {
            if let Err(err) = job.await {
                handlers.on_error(err);
            }
        })
        .await;

        if let Err(recovered) = outcome {
            handlers.on_panic(recovered);
        }
    }
}
