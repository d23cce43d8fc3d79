//! # Failure handlers.
//!
//! Pools, streams and groups never let a failure escape: task errors go to an
//! [`ErrorHandler`], panics go to a [`PanicHandler`]. Both are plain values
//! injected through the builders; nothing here is process-global.
//!
//! ## Defaults
//! - error handler: none (errors are dropped); [`log_error`] is available to opt in;
//! - panic handler: [`log_panic`], one `tracing::error!` event per panic.

use std::sync::Arc;

use crate::error::TaskError;
use crate::panics::Recovered;

/// Receives every task (or callback) failure.
pub type ErrorHandler = Arc<dyn Fn(TaskError) + Send + Sync + 'static>;

/// Receives every caught panic.
pub type PanicHandler = Arc<dyn Fn(Recovered) + Send + Sync + 'static>;

const PANIC_TAG: &str = "\x1b[31m[panic]\x1b[0m";

/// Default panic handler: logs the panic value and its stack trace.
pub fn log_panic(recovered: Recovered) {
    tracing::error!(
        panic = %recovered.value(),
        "{PANIC_TAG} recovered from panic\n{}",
        recovered.stack()
    );
}

/// Error handler that logs each failure as a warning.
pub fn log_error(err: TaskError) {
    tracing::warn!(error = %err, label = err.as_label(), "task failed");
}

/// Handler pair shared by the workers of one component.
#[derive(Clone)]
pub(crate) struct Handlers {
    pub(crate) error: Option<ErrorHandler>,
    pub(crate) panic: PanicHandler,
}

impl Handlers {
    pub(crate) fn on_error(&self, err: TaskError) {
        if let Some(handler) = &self.error {
            handler(err);
        }
    }

    pub(crate) fn on_panic(&self, recovered: Recovered) {
        (self.panic)(recovered);
    }
}

impl Default for Handlers {
    fn default() -> Self {
        Self {
            error: None,
            panic: Arc::new(log_panic),
        }
    }
}
