//! # Shared configuration for pools and streams.
//!
//! [`Config`] holds the sizing knobs; behavior (tokens, handlers) is set on
//! [`PoolBuilder`](crate::PoolBuilder) / [`StreamBuilder`](crate::StreamBuilder).
//!
//! # Example
//! ```
//! use taskwork::Config;
//!
//! let mut cfg = Config::default();
//! cfg.max_concurrent = 4;
//!
//! assert_eq!(cfg.concurrency_limit(), Some(4));
//! assert_eq!(Config::default().concurrency_limit(), None);
//! ```

use tokio::sync::Semaphore;

/// Sizing configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of live workers (0 = unlimited).
    pub max_concurrent: usize,
    /// Capacity of the ordering queue of an unbounded stream.
    pub queue_capacity: usize,
}

impl Config {
    /// Returns the worker ceiling, `None` when unlimited.
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        match self.max_concurrent {
            0 => None,
            n => Some(n),
        }
    }

    /// Returns `queue_capacity`, at least 1 and at most [`Semaphore::MAX_PERMITS`].
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.clamp(1, Semaphore::MAX_PERMITS)
    }

    /// Capacity of a stream's ordering queue: the worker ceiling when bounded,
    /// `queue_capacity` otherwise. Always a valid channel capacity.
    #[inline]
    pub fn ordering_capacity(&self) -> usize {
        match self.concurrency_limit() {
            Some(n) => n.min(Semaphore::MAX_PERMITS),
            None => self.queue_capacity_clamped(),
        }
    }
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `max_concurrent = 0` (unlimited)
    /// - `queue_capacity = 1024`
    fn default() -> Self {
        Self {
            max_concurrent: 0,
            queue_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_capacity_is_clamped() {
        let cfg = Config {
            max_concurrent: 0,
            queue_capacity: 0,
        };
        assert_eq!(cfg.queue_capacity_clamped(), 1);
    }

    #[test]
    fn test_capacities_fit_a_channel() {
        let unbounded = Config {
            max_concurrent: 0,
            queue_capacity: usize::MAX,
        };
        assert_eq!(unbounded.queue_capacity_clamped(), Semaphore::MAX_PERMITS);
        assert_eq!(unbounded.ordering_capacity(), Semaphore::MAX_PERMITS);

        let bounded = Config {
            max_concurrent: usize::MAX,
            ..Config::default()
        };
        assert_eq!(bounded.ordering_capacity(), Semaphore::MAX_PERMITS);
        assert_eq!(Config::default().ordering_capacity(), 1024);
    }
}
