use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::core::Pool;
use crate::config::Config;
use crate::error::TaskError;
use crate::fail_fast::FailFastPool;
use crate::handlers::Handlers;
use crate::panics::Recovered;

/// Builder for [`Pool`] and [`FailFastPool`].
///
/// # Example
/// ```
/// use taskwork::{Config, Pool};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pool = Pool::builder(Config::default())
///     .with_max_concurrent(4)
///     .with_error_handler(taskwork::log_error)
///     .build();
///
/// assert!(pool.go(async { Ok(()) }).await);
/// pool.wait().await;
/// # }
/// ```
pub struct PoolBuilder {
    cfg: Config,
    token: Option<CancellationToken>,
    handlers: Handlers,
}

impl PoolBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            token: None,
            handlers: Handlers::default(),
        }
    }

    /// Sets the parent token; cancelling it cancels the pool.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Overrides [`Config::max_concurrent`] (0 = unlimited).
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.cfg.max_concurrent = n;
        self
    }

    /// Receives every task failure. Without one, failures are dropped.
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(TaskError) + Send + Sync + 'static,
    {
        self.handlers.error = Some(Arc::new(handler));
        self
    }

    /// Receives every caught panic. Defaults to [`log_panic`](crate::log_panic).
    pub fn with_panic_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(Recovered) + Send + Sync + 'static,
    {
        self.handlers.panic = Arc::new(handler);
        self
    }

    /// Builds the pool.
    pub fn build(self) -> Pool {
        let (cfg, parent, handlers) = self.into_parts();
        Pool::from_parts(cfg, parent, handlers)
    }

    /// Builds a pool that captures its first failure and cancels itself.
    pub fn build_fail_fast(self) -> FailFastPool {
        let (cfg, parent, handlers) = self.into_parts();
        FailFastPool::from_parts(cfg, parent, handlers)
    }

    fn into_parts(self) -> (Config, CancellationToken, Handlers) {
        (self.cfg, self.token.unwrap_or_default(), self.handlers)
    }
}
