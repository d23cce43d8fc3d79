//! Completion slots connecting stream workers to the ordering reader.
//!
//! One [`Slot`] per in-flight task: fulfilled exactly once by the worker (or by
//! `go` on rejection), drained exactly once by the reader, then returned to the
//! [`SlotPool`].

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use super::callback::Callback;
use crate::error::TaskError;
use crate::panics::Recovered;

/// Free slots kept for reuse.
const RETAINED_SLOTS: usize = 256;

pub(crate) enum Completion {
    /// Phase one succeeded.
    Done(Option<Callback>),
    /// Phase one returned an error.
    Failed(TaskError),
    /// Phase one panicked.
    Panicked(Recovered),
    /// The pool refused the task; nothing ran.
    Rejected,
}

pub(crate) struct Slot {
    value: Mutex<Option<Completion>>,
    ready: Notify,
}

impl Slot {
    fn new() -> Self {
        Self {
            value: Mutex::new(None),
            ready: Notify::new(),
        }
    }

    pub(crate) fn fulfill(&self, completion: Completion) {
        *self.value.lock() = Some(completion);
        self.ready.notify_one();
    }

    pub(crate) async fn wait(&self) -> Completion {
        loop {
            let taken = self.value.lock().take();
            if let Some(completion) = taken {
                return completion;
            }
            // A permit left by an earlier fulfilment only costs one extra loop.
            self.ready.notified().await;
        }
    }
}

#[derive(Default)]
pub(crate) struct SlotPool {
    free: Mutex<Vec<Arc<Slot>>>,
}

impl SlotPool {
    pub(crate) fn acquire(&self) -> Arc<Slot> {
        self.free
            .lock()
            .pop()
            .unwrap_or_else(|| Arc::new(Slot::new()))
    }

    pub(crate) fn release(&self, slot: Arc<Slot>) {
        slot.value.lock().take();
        let mut free = self.free.lock();
        if free.len() < RETAINED_SLOTS {
            free.push(slot);
        }
    }
}
