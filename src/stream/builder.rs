use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::core::Stream;
use crate::config::Config;
use crate::error::TaskError;
use crate::fail_fast::FailFastStream;
use crate::handlers::Handlers;
use crate::panics::Recovered;

/// Builder for [`Stream`] and [`FailFastStream`].
///
/// Handlers receive failures of both phases. The same settings as
/// [`PoolBuilder`](crate::PoolBuilder) apply to the underlying pool.
pub struct StreamBuilder {
    cfg: Config,
    token: Option<CancellationToken>,
    handlers: Handlers,
}

impl StreamBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            token: None,
            handlers: Handlers::default(),
        }
    }

    /// Sets the parent token; cancelling it cancels the stream and its pool.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Overrides [`Config::max_concurrent`] (0 = unlimited).
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.cfg.max_concurrent = n;
        self
    }

    /// Receives every phase-one and callback failure.
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

    /// Builds the stream.
    pub fn build(self) -> Stream {
        Stream::from_parts(self.cfg, self.token.unwrap_or_default(), self.handlers)
    }

    /// Builds a stream that captures its first failure and cancels itself.
    pub fn build_fail_fast(self) -> FailFastStream {
        FailFastStream::from_parts(self.cfg, self.token.unwrap_or_default(), self.handlers)
    }
}
