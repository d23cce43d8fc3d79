use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::actor::{Actor, ContextActor, FnActor};
use crate::error::TaskError;
use crate::group::WaitGroup;
use crate::handlers::{PanicHandler, log_panic};
use crate::panics::{Recovered, catch_blocking};

/// Runs actors together; the first to finish interrupts all of them.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use taskwork::{TaskError, TaskGroup, skip_interrupt_ctx};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut group = TaskGroup::new();
/// group
///     .add_context(
///         |token| async move {
///             token.cancelled().await;
///             Ok(())
///         },
///         skip_interrupt_ctx(),
///     )
///     .add(
///         || async {
///             tokio::time::sleep(Duration::from_millis(10)).await;
///             Err(TaskError::fail("x"))
///         },
///         |_| {},
///     );
///
/// let err = group.run().await.unwrap_err();
/// assert_eq!(err.to_string(), "x");
/// # }
/// ```
pub struct TaskGroup {
    actors: Vec<Arc<dyn Actor>>,
    on_panic: PanicHandler,
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self {
            actors: Vec::new(),
            on_panic: Arc::new(log_panic),
        }
    }
}

impl TaskGroup {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the handler for panics raised by an actor's interrupt closure.
    ///
    /// Defaults to [`log_panic`]. Panics inside `execute` are not routed here;
    /// they become the outcome of [`run`](Self::run).
    pub fn with_panic_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(Recovered) + Send + Sync + 'static,
    {
        self.on_panic = Arc::new(handler);
        self
    }

    /// Adds an actor from an execute closure and an interrupt closure.
    ///
    /// `interrupt` receives the first actor's error (`None` on success) and
    /// must make `execute` return.
    pub fn add<E, Fut, I>(&mut self, execute: E, interrupt: I) -> &mut Self
    where
        E: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
        I: Fn(Option<&TaskError>) + Send + Sync + 'static,
    {
        self.add_actor(FnActor::new(execute, interrupt))
    }

    /// Adds an actor whose execute closure receives a per-run token.
    ///
    /// On interruption the token is cancelled before `interrupt` is called.
    pub fn add_context<E, Fut, I>(&mut self, execute: E, interrupt: I) -> &mut Self
    where
        E: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
        I: Fn(&CancellationToken, Option<&TaskError>) + Send + Sync + 'static,
    {
        self.add_actor(ContextActor::new(execute, interrupt))
    }

    /// Adds any [`Actor`].
    pub fn add_actor<A: Actor>(&mut self, actor: A) -> &mut Self {
        self.actors.push(Arc::new(actor));
        self
    }

    /// Number of actors.
    pub fn size(&self) -> usize {
        self.actors.len()
    }

    /// Returns `true` if no actor was added.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Runs every actor until the first one finishes, interrupts all of them,
    /// waits for every `execute` to return and yields the first outcome.
    ///
    /// A panicking `execute` finishes with [`TaskError::Panicked`]. An empty
    /// group returns `Ok(())` immediately. May be called again after it returns.
    pub async fn run(&self) -> Result<(), TaskError> {
        if self.actors.is_empty() {
            return Ok(());
        }

        let (tx, mut rx) = mpsc::channel(self.actors.len());
        let on_panic = tx.clone();
        let group = WaitGroup::with_panic_handler(Arc::new(move |recovered| {
            let _ = on_panic.try_send(Err(TaskError::Panicked(recovered.into_error())));
        }));

        let tokens: Vec<CancellationToken> =
            self.actors.iter().map(|_| CancellationToken::new()).collect();

        for (actor, token) in self.actors.iter().zip(&tokens) {
            let actor = Arc::clone(actor);
            let token = token.clone();
            let tx = tx.clone();
            group.go(async move {
                let outcome = actor.execute(token).await;
                let _ = tx.try_send(outcome);
            });
        }
        drop(tx);
        tracing::debug!(actors = self.actors.len(), "task group started");

        // Every actor reports exactly once, through `tx` or the panic handler.
        let first = rx.recv().await.unwrap_or(Ok(()));
        if let Err(err) = &first {
            tracing::debug!(label = err.as_label(), error = %err, "first actor failed");
        }

        let reason = first.as_ref().err();
        for (actor, token) in self.actors.iter().zip(&tokens) {
            if let Err(recovered) = catch_blocking(|| actor.interrupt(token, reason)) {
                (self.on_panic)(recovered);
            }
        }

        group.wait().await;
        tracing::debug!("task group stopped");
        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taskgroup::{skip_interrupt, skip_interrupt_ctx};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_empty_group() {
        let group = TaskGroup::new();
        assert!(group.is_empty());
        assert!(group.run().await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_first_success_interrupts_all() {
        let interrupts = Arc::new(AtomicUsize::new(0));
        let mut group = TaskGroup::new();

        group.add(|| async { Ok(()) }, {
            let i = interrupts.clone();
            move |reason| {
                assert!(reason.is_none());
                i.fetch_add(1, Ordering::SeqCst);
            }
        });
        group.add_context(
            |token| async move {
                token.cancelled().await;
                Err(TaskError::Canceled)
            },
            {
                let i = interrupts.clone();
                move |token, _| {
                    assert!(token.is_cancelled());
                    i.fetch_add(1, Ordering::SeqCst);
                }
            },
        );

        assert!(group.run().await.is_ok());
        assert_eq!(interrupts.load(Ordering::SeqCst), 2);
        assert_eq!(group.size(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_panic_becomes_outcome() {
        let mut group = TaskGroup::new();
        group
            .add(|| async { panic!("actor exploded") }, skip_interrupt())
            .add_context(
                |token| async move {
                    token.cancelled().await;
                    Ok(())
                },
                skip_interrupt_ctx(),
            );

        let err = group.run().await.expect_err("panic is the first outcome");
        assert!(err.is_panic());
        assert!(err.to_string().starts_with("panic: actor exploded\n"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rerun_uses_fresh_tokens() {
        let mut group = TaskGroup::new();
        group
            .add_context(
                |token| async move {
                    token.cancelled().await;
                    Ok(())
                },
                skip_interrupt_ctx(),
            )
            .add(|| async { Err(TaskError::fail("done")) }, |_| {});

        for _ in 0..3 {
            let err = group.run().await.expect_err("second actor fails");
            assert_eq!(err.to_string(), "done");
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_interrupt_panic_reaches_handler() {
        let caught = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut group = TaskGroup::new();
        group
            .with_panic_handler({
                let caught = caught.clone();
                move |recovered: Recovered| caught.lock().push(recovered.value().to_string())
            })
            .add(|| async { Err(TaskError::fail("stop")) }, |_| {
                panic!("interrupt exploded")
            })
            .add_context(
                |token| async move {
                    token.cancelled().await;
                    Ok(())
                },
                skip_interrupt_ctx(),
            );

        let err = group.run().await.expect_err("first actor fails");
        assert_eq!(err.to_string(), "stop");
        assert_eq!(*caught.lock(), vec!["interrupt exploded".to_string()]);
    }
}
