use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Worker ceiling of one pool generation.
pub(crate) enum Limiter {
    /// No ceiling; acquisition never blocks.
    Unbounded,
    /// At most `limit` permits outstanding.
    Bounded {
        permits: Arc<Semaphore>,
        limit: usize,
    },
}

/// Held by a worker for its whole life.
pub(crate) enum Permit {
    Unbounded,
    #[allow(dead_code)]
    Bounded(OwnedSemaphorePermit),
}

impl Limiter {
    pub(crate) fn new(limit: Option<usize>) -> Self {
        match limit {
            None => Limiter::Unbounded,
            Some(n) => {
                let limit = n.min(Semaphore::MAX_PERMITS);
                Limiter::Bounded {
                    permits: Arc::new(Semaphore::new(limit)),
                    limit,
                }
            }
        }
    }

    pub(crate) fn limit(&self) -> Option<usize> {
        match self {
            Limiter::Unbounded => None,
            Limiter::Bounded { limit, .. } => Some(*limit),
        }
    }

    /// Waits for a permit. `None` once the limiter is closed.
    pub(crate) async fn acquire(&self) -> Option<Permit> {
        match self {
            Limiter::Unbounded => Some(Permit::Unbounded),
            Limiter::Bounded { permits, .. } => Arc::clone(permits)
                .acquire_owned()
                .await
                .ok()
                .map(Permit::Bounded),
        }
    }

    /// Takes a permit if one is free right now.
    pub(crate) fn try_acquire(&self) -> Option<Permit> {
        match self {
            Limiter::Unbounded => Some(Permit::Unbounded),
            Limiter::Bounded { permits, .. } => Arc::clone(permits)
                .try_acquire_owned()
                .ok()
                .map(Permit::Bounded),
        }
    }

    /// Wakes every waiter with `None`; later acquisitions fail.
    pub(crate) fn close(&self) {
        if let Limiter::Bounded { permits, .. } = self {
            permits.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_never_blocks() {
        let limiter = Limiter::new(None);
        let held: Vec<_> = (0..1000).filter_map(|_| limiter.try_acquire()).collect();
        assert_eq!(held.len(), 1000);
        assert_eq!(limiter.limit(), None);
    }

    #[test]
    fn test_bounded_ceiling_and_release() {
        let limiter = Limiter::new(Some(2));
        let a = limiter.try_acquire();
        let b = limiter.try_acquire();
        assert!(a.is_some() && b.is_some());
        assert!(limiter.try_acquire().is_none());

        drop(a);
        assert!(limiter.try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_close_wakes_waiters() {
        let limiter = Arc::new(Limiter::new(Some(1)));
        let _held = limiter.try_acquire();

        let waiter = {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move { limiter.acquire().await.is_none() })
        };
        tokio::task::yield_now().await;
        limiter.close();

        assert!(waiter.await.expect("waiter task"));
        assert!(limiter.try_acquire().is_none());
    }
}
