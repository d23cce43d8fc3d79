use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::builder::StreamBuilder;
use super::callback::Callback;
use super::completion::{Completion, Slot, SlotPool};
use crate::config::Config;
use crate::error::TaskError;
use crate::group::WaitGroup;
use crate::handlers::Handlers;
use crate::panics::catch;
use crate::pool::Pool;

/// Worker pool whose callbacks run in submission order.
pub struct Stream {
    pool: Pool,
    parent: CancellationToken,
    queue_capacity: usize,
    handlers: Handlers,
    slots: Arc<SlotPool>,
    state: Arc<RwLock<Arc<Sequencer>>>,
    stopped: AtomicBool,
}

/// Ordering queue and reader of one stream generation.
struct Sequencer {
    token: CancellationToken,
    tx: Mutex<Option<mpsc::Sender<Arc<Slot>>>>,
    /// Taken by the first `go`, which starts the reader.
    rx: Mutex<Option<mpsc::Receiver<Arc<Slot>>>>,
    reader: WaitGroup,
}

impl Sequencer {
    fn new(parent: &CancellationToken, capacity: usize, handlers: &Handlers) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(capacity);
        Arc::new(Self {
            token: parent.child_token(),
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
            reader: WaitGroup::with_panic_handler(Arc::clone(&handlers.panic)),
        })
    }

    fn sender(&self) -> Option<mpsc::Sender<Arc<Slot>>> {
        self.tx.lock().clone()
    }

    fn close_queue(&self) {
        self.tx.lock().take();
    }

    fn start_reader(&self, slots: &Arc<SlotPool>, handlers: &Handlers) {
        let Some(rx) = self.rx.lock().take() else {
            return;
        };
        tracing::trace!("stream reader started");
        self.reader.go(read(
            rx,
            self.token.clone(),
            Arc::clone(slots),
            handlers.clone(),
        ));
    }
}

impl Stream {
    /// Creates a stream with default handlers and a fresh root token.
    pub fn new(cfg: Config) -> Self {
        StreamBuilder::new(cfg).build()
    }

    /// Starts a [`StreamBuilder`].
    pub fn builder(cfg: Config) -> StreamBuilder {
        StreamBuilder::new(cfg)
    }

    pub(crate) fn from_parts(cfg: Config, parent: CancellationToken, handlers: Handlers) -> Self {
        let queue_capacity = cfg.ordering_capacity();

        // Pool tasks fulfil slots and never fail; only panics can reach its handlers.
        let pool_handlers = Handlers {
            error: None,
            panic: Arc::clone(&handlers.panic),
        };
        let pool = Pool::from_parts(cfg, parent.clone(), pool_handlers);
        let seq = Sequencer::new(&parent, queue_capacity, &handlers);

        Self {
            pool,
            parent,
            queue_capacity,
            handlers,
            slots: Arc::new(SlotPool::default()),
            state: Arc::new(RwLock::new(seq)),
            stopped: AtomicBool::new(false),
        }
    }

    fn current(&self) -> Arc<Sequencer> {
        Arc::clone(&self.state.read())
    }

    /// Submits a task whose optional callback runs after every earlier one.
    ///
    /// Returns `false` if the stream is stopped or cancelled; the task is
    /// dropped. Suspends while the ordering queue or the pool is full.
    pub async fn go<F>(&self, task: F) -> bool
    where
        F: Future<Output = Result<Option<Callback>, TaskError>> + Send + 'static,
    {
        if self.is_stopped() {
            return false;
        }
        let seq = self.current();
        if seq.token.is_cancelled() {
            return false;
        }
        let Some(tx) = seq.sender() else {
            return false;
        };
        seq.start_reader(&self.slots, &self.handlers);

        let slot = self.slots.acquire();
        let pushed = tokio::select! {
            biased;
            _ = seq.token.cancelled() => false,
            sent = tx.send(Arc::clone(&slot)) => sent.is_ok(),
        };
        if !pushed {
            self.slots.release(slot);
            return false;
        }

        let fulfil = Arc::clone(&slot);
        let accepted = self
            .pool
            .go(async move {
                let completion = match catch(task).await {
                    Ok(Ok(callback)) => Completion::Done(callback),
                    Ok(Err(err)) => Completion::Failed(err),
                    Err(recovered) => Completion::Panicked(recovered),
                };
                fulfil.fulfill(completion);
                Ok(())
            })
            .await;

        if !accepted {
            slot.fulfill(Completion::Rejected);
        }
        accepted
    }

    /// Runs every accepted task and callback to completion, then joins the reader.
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
        let seq = self.current();
        self.pool.wait().await;
        seq.close_queue();
        seq.reader.wait().await;
        tracing::debug!("stream stopped");
    }

    /// Waits, then re-arms the stream and its pool.
    pub async fn reset(&self) {
        self.wait().await;
        self.pool.reset().await;
        *self.state.write() = Sequencer::new(&self.parent, self.queue_capacity, &self.handlers);
        self.stopped.store(false, Ordering::Release);
        tracing::debug!("stream reset");
    }

    /// Cancels the stream and its pool; pending callbacks are skipped.
    pub fn cancel(&self) {
        self.current().token.cancel();
        self.pool.cancel();
    }

    /// Token of the current generation.
    pub fn token(&self) -> CancellationToken {
        self.current().token.clone()
    }

    /// Returns `true` once [`wait`](Self::wait) has started (until [`reset`](Self::reset)).
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Worker ceiling, `None` when unbounded.
    pub fn max_concurrent(&self) -> Option<usize> {
        self.pool.max_concurrent()
    }

    /// Closure cancelling whichever generation is current when it runs.
    pub(crate) fn canceller(&self) -> impl Fn() + Send + Sync + use<> {
        let state = Arc::downgrade(&self.state);
        let cancel_pool = self.pool.canceller();
        move || {
            if let Some(state) = state.upgrade() {
                state.read().token.cancel();
            }
            cancel_pool();
        }
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        let seq = self.state.read();
        seq.token.cancel();
        seq.close_queue();
    }
}

/// Drains the ordering queue in FIFO order.
async fn read(
    mut rx: mpsc::Receiver<Arc<Slot>>,
    token: CancellationToken,
    slots: Arc<SlotPool>,
    handlers: Handlers,
) {
    while let Some(slot) = rx.recv().await {
        let completion = slot.wait().await;
        slots.release(slot);

        if let Err(recovered) = catch(dispatch(completion, &token, &handlers)).await {
            handlers.on_panic(recovered);
        }
    }
    tracing::trace!("stream reader exited");
}

async fn dispatch(completion: Completion, token: &CancellationToken, handlers: &Handlers) {
    match completion {
        Completion::Panicked(recovered) => handlers.on_panic(recovered),
        Completion::Failed(err) => handlers.on_error(err),
        Completion::Rejected => {}
        Completion::Done(callback) => {
            if token.is_cancelled() {
                return;
            }
            if let Some(callback) = callback {
                if let Err(err) = callback.into_future().await {
                    handlers.on_error(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn collect() -> (Arc<Mutex<Vec<usize>>>, Arc<Mutex<Vec<usize>>>) {
        (Arc::new(Mutex::new(Vec::new())), Arc::new(Mutex::new(Vec::new())))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_callbacks_follow_submission_order() {
        let stream = Stream::new(Config {
            max_concurrent: 4,
            ..Config::default()
        });
        let (seen, _) = collect();

        for i in 0..20usize {
            let seen = Arc::clone(&seen);
            stream
                .go(async move {
                    // Later tasks finish first.
                    tokio::time::sleep(Duration::from_millis((20 - i as u64) % 5)).await;
                    Ok(Some(Callback::from_fn(move || {
                        seen.lock().push(i);
                        Ok(())
                    })))
                })
                .await;
        }
        stream.wait().await;

        assert_eq!(*seen.lock(), (0..20).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failures_and_panics_are_routed() {
        let errors = Arc::new(AtomicUsize::new(0));
        let panics = Arc::new(AtomicUsize::new(0));
        let (e, p) = (errors.clone(), panics.clone());
        let stream = Stream::builder(Config::default())
            .with_error_handler(move |_| {
                e.fetch_add(1, Ordering::SeqCst);
            })
            .with_panic_handler(move |_| {
                p.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        stream.go(async { Err(TaskError::fail("phase one")) }).await;
        stream
            .go(async { Ok(Some(Callback::new(async { Err(TaskError::fail("phase two")) }))) })
            .await;
        stream.go(async { panic!("phase one panic") }).await;
        stream
            .go(async { Ok(Some(Callback::from_fn(|| panic!("callback panic")))) })
            .await;
        stream.go(async { Ok(None) }).await;
        stream.wait().await;

        assert_eq!(errors.load(Ordering::SeqCst), 2);
        assert_eq!(panics.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_oversized_capacities() {
        let configs = [
            Config {
                max_concurrent: usize::MAX,
                ..Config::default()
            },
            Config {
                max_concurrent: 0,
                queue_capacity: usize::MAX,
            },
        ];

        for cfg in configs {
            let stream = Stream::new(cfg);
            let (seen, _) = collect();
            let s = Arc::clone(&seen);
            assert!(
                stream
                    .go(async move {
                        Ok(Some(Callback::from_fn(move || {
                            s.lock().push(1);
                            Ok(())
                        })))
                    })
                    .await
            );
            stream.wait().await;
            assert_eq!(*seen.lock(), vec![1]);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_wait_without_tasks() {
        let stream = Stream::new(Config::default());
        stream.wait().await;
        stream.wait().await;
        assert!(stream.is_stopped());
        assert!(!stream.go(async { Ok(None) }).await);
    }
}
