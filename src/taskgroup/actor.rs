//! # Actor abstraction.
//!
//! An [`Actor`] is an (execute, interrupt) pair. [`TaskGroup`](crate::TaskGroup)
//! runs every actor's `execute` concurrently and, once the first returns, calls
//! every actor's `interrupt` with that outcome.
//!
//! ## Rules
//! - `execute` receives a fresh token per [`run`](crate::TaskGroup::run).
//! - `interrupt` must make `execute` return soon; it must not block.

use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// A long-running unit managed by a [`TaskGroup`](crate::TaskGroup).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use taskwork::{Actor, TaskError};
///
/// struct Ticker;
///
/// #[async_trait]
/// impl Actor for Ticker {
///     async fn execute(&self, token: CancellationToken) -> Result<(), TaskError> {
///         token.cancelled().await;
///         Ok(())
///     }
///
///     fn interrupt(&self, token: &CancellationToken, _reason: Option<&TaskError>) {
///         token.cancel();
///     }
/// }
/// ```
#[async_trait]
pub trait Actor: Send + Sync + 'static {
    /// Runs until done, failed or interrupted.
    async fn execute(&self, token: CancellationToken) -> Result<(), TaskError>;

    /// Asks `execute` to return. `reason` is the outcome of the first actor
    /// that finished (`None` if it succeeded).
    fn interrupt(&self, token: &CancellationToken, reason: Option<&TaskError>);
}

type ExecuteFn = Box<dyn Fn() -> BoxFuture<'static, Result<(), TaskError>> + Send + Sync>;
type InterruptFn = Box<dyn Fn(Option<&TaskError>) + Send + Sync>;

type ContextExecuteFn =
    Box<dyn Fn(CancellationToken) -> BoxFuture<'static, Result<(), TaskError>> + Send + Sync>;
type ContextInterruptFn = Box<dyn Fn(&CancellationToken, Option<&TaskError>) + Send + Sync>;

/// Actor built from closures that ignore the run token.
pub(crate) struct FnActor {
    execute: ExecuteFn,
    interrupt: InterruptFn,
}

impl FnActor {
    pub(crate) fn new<E, Fut, I>(execute: E, interrupt: I) -> Self
    where
        E: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
        I: Fn(Option<&TaskError>) + Send + Sync + 'static,
    {
        Self {
            execute: Box::new(move || Box::pin(execute())),
            interrupt: Box::new(interrupt),
        }
    }
}

#[async_trait]
impl Actor for FnActor {
    async fn execute(&self, _token: CancellationToken) -> Result<(), TaskError> {
        (self.execute)().await
    }

    fn interrupt(&self, _token: &CancellationToken, reason: Option<&TaskError>) {
        (self.interrupt)(reason);
    }
}

/// Actor built from closures that receive the run token.
///
/// Interrupting cancels the token before calling the closure.
pub(crate) struct ContextActor {
    execute: ContextExecuteFn,
    interrupt: ContextInterruptFn,
}

impl ContextActor {
    pub(crate) fn new<E, Fut, I>(execute: E, interrupt: I) -> Self
    where
        E: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
        I: Fn(&CancellationToken, Option<&TaskError>) + Send + Sync + 'static,
    {
        Self {
            execute: Box::new(move |token| Box::pin(execute(token))),
            interrupt: Box::new(interrupt),
        }
    }
}

#[async_trait]
impl Actor for ContextActor {
    async fn execute(&self, token: CancellationToken) -> Result<(), TaskError> {
        (self.execute)(token).await
    }

    fn interrupt(&self, token: &CancellationToken, reason: Option<&TaskError>) {
        token.cancel();
        (self.interrupt)(token, reason);
    }
}

/// Interrupt for [`TaskGroup::add`](crate::TaskGroup::add) that does nothing.
pub fn skip_interrupt() -> impl Fn(Option<&TaskError>) + Send + Sync + 'static {
    |_: Option<&TaskError>| {}
}

/// Interrupt for [`TaskGroup::add_context`](crate::TaskGroup::add_context) that
/// does nothing beyond the token cancellation.
pub fn skip_interrupt_ctx() -> impl Fn(&CancellationToken, Option<&TaskError>) + Send + Sync + 'static
{
    |_: &CancellationToken, _: Option<&TaskError>| {}
}
