use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;

use crate::error::TaskError;

/// Second phase of a stream task, run in submission order.
///
/// # Example
/// ```
/// use taskwork::{Callback, TaskError};
///
/// let ordered = Callback::from_fn(|| {
///     println!("runs after every earlier callback");
///     Ok(())
/// });
/// let failing = Callback::new(async { Err(TaskError::fail("write failed")) });
/// # drop((ordered, failing));
/// ```
pub struct Callback(BoxFuture<'static, Result<(), TaskError>>);

impl Callback {
    /// Wraps a future.
    pub fn new<F>(fut: F) -> Self
    where
        F: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self(Box::pin(fut))
    }

    /// Wraps a synchronous closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), TaskError> + Send + 'static,
    {
        Self::new(async move { f() })
    }

    pub(crate) fn into_future(self) -> BoxFuture<'static, Result<(), TaskError>> {
        self.0
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}
