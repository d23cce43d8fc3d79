use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::TaskError;
use crate::handlers::Handlers;
use crate::panics::Recovered;

type Receiver = oneshot::Receiver<Arc<TaskError>>;
type Sender = oneshot::Sender<Arc<TaskError>>;

/// Exactly-once capture of the first failure.
pub(crate) struct FirstError {
    gate: AtomicBool,
    error: Mutex<Option<Arc<TaskError>>>,
    tx: Mutex<Option<Sender>>,
    rx: Mutex<Option<Receiver>>,
    /// Cancels the wrapped component; bound after it is built.
    on_first: OnceLock<Box<dyn Fn() + Send + Sync>>,
}

impl FirstError {
    pub(crate) fn new() -> Arc<Self> {
        let (tx, rx) = oneshot::channel();
        Arc::new(Self {
            gate: AtomicBool::new(false),
            error: Mutex::new(None),
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
            on_first: OnceLock::new(),
        })
    }

    pub(crate) fn bind(&self, cancel: impl Fn() + Send + Sync + 'static) {
        let _ = self.on_first.set(Box::new(cancel));
    }

    /// Stores `err` if it is the first failure. Returns whether it was.
    pub(crate) fn record(&self, err: TaskError) -> bool {
        if self
            .gate
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        tracing::debug!(label = err.as_label(), error = %err, "first failure captured");
        let err = Arc::new(err);
        *self.error.lock() = Some(Arc::clone(&err));
        if let Some(tx) = self.tx.lock().take() {
            let _ = tx.send(err);
        }
        if let Some(cancel) = self.on_first.get() {
            cancel();
        }
        true
    }

    pub(crate) fn error(&self) -> Option<Arc<TaskError>> {
        self.error.lock().clone()
    }

    pub(crate) fn take_channel(&self) -> Option<Receiver> {
        self.rx.lock().take()
    }

    /// Drops the sender; a receiver that got nothing now reports closed.
    pub(crate) fn close(&self) {
        self.tx.lock().take();
    }

    pub(crate) fn reset(&self) {
        let (tx, rx) = oneshot::channel();
        *self.error.lock() = None;
        *self.tx.lock() = Some(tx);
        *self.rx.lock() = Some(rx);
        self.gate.store(false, Ordering::Release);
    }

    /// Wraps caller handlers so every failure passes through the gate first.
    ///
    /// Panics are recorded as [`TaskError::Panicked`].
    pub(crate) fn wrap(self: &Arc<Self>, user: Handlers) -> Handlers {
        let on_error = {
            let first = Arc::clone(self);
            let user = user.clone();
            move |err: TaskError| {
                first.record(err.clone());
                user.on_error(err);
            }
        };
        let on_panic = {
            let first = Arc::clone(self);
            move |recovered: Recovered| {
                first.record(TaskError::Panicked(recovered.as_error()));
                user.on_panic(recovered);
            }
        };

        Handlers {
            error: Some(Arc::new(on_error)),
            panic: Arc::new(on_panic),
        }
    }
}
