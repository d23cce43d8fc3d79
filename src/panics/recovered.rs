//! # Structured representation of a caught panic.
//!
//! [`Recovered`] captures the panic payload and a backtrace at the point where
//! the panic was intercepted. It can be rendered for logs, or converted into a
//! [`RecoveredError`] that implements [`std::error::Error`].
//!
//! ## Payload handling
//! ```text
//! payload ──► String / &'static str ──► value = message,  cause = None
//!         ──► BoxError / TaskError   ──► value = error.to_string(), cause = Some(error)
//!         ──► anything else          ──► value = "unknown panic", cause = None
//! ```
//!
//! ## Rules
//! - The backtrace is always captured (independent of `RUST_BACKTRACE`).
//! - The backtrace is taken where the panic is intercepted, after the stack has
//!   unwound. Its frames show the catch site (the component that ran the task),
//!   not the line that panicked. The panic location is still printed by the
//!   process panic hook; install one with [`std::panic::set_hook`] to keep it.
//! - `Recovered` is immutable and cheap to clone (shared via `Arc`).
//! - [`RecoveredError::source`](std::error::Error::source) returns the cause when
//!   the payload was an error value.

use std::any::Any;
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, TaskError};

const UNKNOWN_PANIC: &str = "unknown panic";

/// A panic that was caught at a component boundary.
#[derive(Clone)]
pub struct Recovered {
    value: Arc<str>,
    cause: Option<Arc<dyn Error + Send + Sync + 'static>>,
    stack: Arc<str>,
}

impl Recovered {
    /// Creates a `Recovered` from a panic payload and captures a backtrace.
    ///
    /// `skip` drops that many leading frames from the rendered backtrace;
    /// `0` keeps the frames of the capture itself. Frame skipping is best
    /// effort: if frames cannot be delimited the whole trace is kept.
    pub fn new(skip: usize, payload: Box<dyn Any + Send>) -> Self {
        let (value, cause) = describe(payload);
        let backtrace = Backtrace::force_capture();

        Self {
            value: value.into(),
            cause,
            stack: skip_frames(&backtrace.to_string(), skip).into(),
        }
    }

    /// The panic payload rendered as text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The payload itself, when the panic carried an error value.
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// The rendered backtrace.
    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// Converts into an error implementation unwrappable to the panic cause.
    pub fn as_error(&self) -> RecoveredError {
        RecoveredError {
            recovered: self.clone(),
        }
    }

    /// Same as [`as_error`](Self::as_error) without cloning.
    pub fn into_error(self) -> RecoveredError {
        RecoveredError { recovered: self }
    }
}

impl fmt::Display for Recovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panic: {}\nstacktrace:\n{}", self.value, self.stack)
    }
}

impl fmt::Debug for Recovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recovered")
            .field("value", &self.value)
            .field("cause", &self.cause)
            .finish_non_exhaustive()
    }
}

/// [`Recovered`] wrapped in an [`Error`] implementation.
#[derive(Clone, Debug)]
pub struct RecoveredError {
    recovered: Recovered,
}

impl RecoveredError {
    /// Returns the underlying panic record.
    pub fn recovered(&self) -> &Recovered {
        &self.recovered
    }
}

impl fmt::Display for RecoveredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.recovered, f)
    }
}

impl Error for RecoveredError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.recovered.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

impl From<Recovered> for RecoveredError {
    fn from(recovered: Recovered) -> Self {
        recovered.into_error()
    }
}

/// Splits a payload into a printable value and an optional error cause.
fn describe(payload: Box<dyn Any + Send>) -> (String, Option<Arc<dyn Error + Send + Sync>>) {
    let payload = match payload.downcast::<String>() {
        Ok(msg) => return (*msg, None),
        Err(other) => other,
    };
    let payload = match payload.downcast::<&'static str>() {
        Ok(msg) => return ((*msg).to_string(), None),
        Err(other) => other,
    };
    let payload = match payload.downcast::<BoxError>() {
        Ok(err) => {
            let err: Arc<dyn Error + Send + Sync> = Arc::from(*err);
            return (err.to_string(), Some(err));
        }
        Err(other) => other,
    };
    match payload.downcast::<TaskError>() {
        Ok(err) => {
            let err: Arc<dyn Error + Send + Sync> = Arc::new(*err);
            (err.to_string(), Some(err))
        }
        Err(_) => (UNKNOWN_PANIC.to_string(), None),
    }
}

/// Drops the first `skip` frames of a rendered [`Backtrace`].
///
/// Frames start with a line of the form `"  <index>: <symbol>"`.
fn skip_frames(rendered: &str, skip: usize) -> String {
    if skip == 0 {
        return rendered.to_string();
    }

    let mut frames = 0usize;
    let mut out = String::with_capacity(rendered.len());
    for line in rendered.lines() {
        if is_frame_header(line) {
            frames += 1;
        }
        if frames == 0 || frames > skip {
            out.push_str(line);
            out.push('\n');
        }
    }

    if frames <= skip {
        rendered.to_string()
    } else {
        out
    }
}

fn is_frame_header(line: &str) -> bool {
    match line.trim_start().split_once(": ") {
        Some((index, _)) => !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("socket closed")]
    struct SocketClosed;

    #[test]
    fn test_string_payload() {
        let rec = Recovered::new(0, Box::new(String::from("boom")));
        assert_eq!(rec.value(), "boom");
        assert!(rec.cause().is_none());
        assert!(rec.to_string().starts_with("panic: boom\nstacktrace:\n"));
    }

    #[test]
    fn test_str_payload() {
        let rec = Recovered::new(0, Box::new("static boom"));
        assert_eq!(rec.value(), "static boom");
    }

    #[test]
    fn test_error_payload_is_unwrappable() {
        let payload: BoxError = Box::new(SocketClosed);
        let rec = Recovered::new(0, Box::new(payload));
        assert_eq!(rec.value(), "socket closed");

        let err = rec.as_error();
        let source = err.source().expect("error payload becomes the source");
        assert!(source.downcast_ref::<SocketClosed>().is_some());
    }

    #[test]
    fn test_task_error_payload_is_unwrappable() {
        let rec = Recovered::new(0, Box::new(TaskError::Canceled));
        let err = rec.into_error();
        let source = err.source().expect("task error payload becomes the source");
        assert!(matches!(
            source.downcast_ref::<TaskError>(),
            Some(TaskError::Canceled)
        ));
    }

    #[test]
    fn test_opaque_payload() {
        let rec = Recovered::new(0, Box::new(42u32));
        assert_eq!(rec.value(), UNKNOWN_PANIC);
        assert!(rec.as_error().source().is_none());
    }

    #[test]
    fn test_stack_is_captured_at_catch_site() {
        let payload =
            std::panic::catch_unwind(|| -> u32 { panic!("deep") }).expect_err("closure panics");
        let rec = Recovered::new(0, payload);
        assert_eq!(rec.value(), "deep");
        assert!(!rec.stack().trim().is_empty());
        assert!(rec.to_string().ends_with(rec.stack()));
    }

    #[test]
    fn test_skip_frames() {
        let rendered = "   0: first\n             at a.rs:1:1\n   1: second\n   2: third\n";
        assert_eq!(skip_frames(rendered, 0), rendered);
        assert_eq!(skip_frames(rendered, 1), "   1: second\n   2: third\n");
        assert_eq!(skip_frames(rendered, 2), "   2: third\n");
        // Skipping everything keeps the whole trace.
        assert_eq!(skip_frames(rendered, 3), rendered);
        assert_eq!(skip_frames("disabled backtrace", 2), "disabled backtrace");
    }
}
