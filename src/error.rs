//! Error types used by pools, streams and task groups.
//!
//! This module defines a single error enum, [`TaskError`], shared by every
//! component:
//!
//! - task failures reported by user code ([`TaskError::Fail`]);
//! - outcomes that terminate an actor in a [`TaskGroup`](crate::TaskGroup)
//!   ([`TaskError::Canceled`], [`TaskError::Signal`]);
//! - panics converted into errors ([`TaskError::Panicked`]).
//!
//! It provides helper methods (`as_label`, `is_*`) for logs and branching.

use std::sync::Arc;

use thiserror::Error;

use crate::panics::RecoveredError;
use crate::taskgroup::Signal;

/// Boxed, thread-safe error accepted by [`TaskError::fail`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared cause of [`TaskError::Fail`]; keeps `TaskError` cheap to clone.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// # Errors produced by task execution.
///
/// Pools and streams forward `Fail` to the configured error handler and never
/// stop because of it. Task groups return the first outcome from
/// [`TaskGroup::run`](crate::TaskGroup::run), which may be any variant.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    /// Task execution failed with the wrapped error.
    #[error("{0}")]
    Fail(#[source] SharedError),

    /// A cancellation token was cancelled.
    #[error("context cancelled")]
    Canceled,

    /// The process received an OS signal.
    #[error("terminated by signal: {signal}")]
    Signal {
        /// The signal that was received.
        signal: Signal,
    },

    /// A panic was caught and converted into an error.
    #[error(transparent)]
    Panicked(#[from] RecoveredError),
}

impl TaskError {
    /// Wraps any error (or message) as a [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use taskwork::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.to_string(), "connection refused");
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn fail(error: impl Into<BoxError>) -> Self {
        TaskError::Fail(Arc::from(error.into()))
    }

    /// Returns the wrapped error of [`TaskError::Fail`], for downcasting.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            TaskError::Fail(cause) => Some(cause.as_ref()),
            _ => None,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail(_) => "task_failed",
            TaskError::Canceled => "task_canceled",
            TaskError::Signal { .. } => "task_signaled",
            TaskError::Panicked(_) => "task_panicked",
        }
    }

    /// Returns `true` if the outcome was caused by an OS signal.
    ///
    /// # Example
    /// ```
    /// use taskwork::{Signal, TaskError};
    ///
    /// assert!(TaskError::Signal { signal: Signal::Interrupt }.is_signal());
    /// assert!(!TaskError::fail("not a signal").is_signal());
    /// ```
    pub fn is_signal(&self) -> bool {
        matches!(self, TaskError::Signal { .. })
    }

    /// Returns `true` for [`TaskError::Canceled`].
    pub fn is_canceled(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }

    /// Returns `true` for [`TaskError::Panicked`].
    pub fn is_panic(&self) -> bool {
        matches!(self, TaskError::Panicked(_))
    }

    /// Returns the received signal, if any.
    pub fn signal(&self) -> Option<Signal> {
        match self {
            TaskError::Signal { signal } => Some(*signal),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error)]
    #[error("disk full")]
    struct DiskFull;

    #[test]
    fn test_fail_keeps_cause() {
        let err = TaskError::fail(DiskFull);
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(err.source().expect("fail has a source").to_string(), "disk full");

        let copy = err.clone();
        assert!(copy.cause().and_then(|c| c.downcast_ref::<DiskFull>()).is_some());
        assert!(TaskError::Canceled.cause().is_none());
    }

    #[test]
    fn test_labels() {
        assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
        assert_eq!(
            TaskError::Signal {
                signal: Signal::Terminate
            }
            .as_label(),
            "task_signaled"
        );
    }

    #[test]
    fn test_signal_accessors() {
        let err = TaskError::Signal {
            signal: Signal::Interrupt,
        };
        assert!(err.is_signal());
        assert_eq!(err.signal(), Some(Signal::Interrupt));
        assert_eq!(err.to_string(), "terminated by signal: interrupt");
        assert!(TaskError::Canceled.signal().is_none());
    }
}
