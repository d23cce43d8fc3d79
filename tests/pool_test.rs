use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rand::Rng;
use taskwork::{Config, Pool, TaskError};

fn bounded(n: usize) -> Config {
    Config {
        max_concurrent: n,
        ..Config::default()
    }
}

/// Tracks the number of tasks running at once and the highest value seen.
#[derive(Default)]
struct Gauge {
    now: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        let now = self.now.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.now.fetch_sub(1, Ordering::SeqCst);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_ceiling_is_never_exceeded() {
    for max in [1usize, 10, 100] {
        let pool = Pool::new(bounded(max));
        let gauge = Arc::new(Gauge::default());
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..max * 10 {
            let gauge = Arc::clone(&gauge);
            let done = Arc::clone(&done);
            let delay = rand::rng().random_range(0..3u64);
            assert!(
                pool.go(async move {
                    gauge.enter();
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    gauge.exit();
                    done.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .await
            );
        }
        pool.wait().await;

        let peak = gauge.peak.load(Ordering::SeqCst);
        assert!(peak <= max, "peak {peak} exceeds ceiling {max}");
        assert!(peak >= 1);
        assert_eq!(done.load(Ordering::SeqCst), max * 10);
        assert_eq!(pool.max_concurrent(), Some(max));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_double_wait() {
    let pool = Pool::new(bounded(2));
    pool.go(async { Ok(()) }).await;

    pool.wait().await;
    pool.wait().await;
    assert!(pool.is_stopped());
    assert!(pool.is_cancelled());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_go_after_wait_is_rejected() {
    let pool = Pool::new(bounded(2));
    pool.wait().await;

    let ran = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&ran);
    let accepted = pool
        .go(async move {
            r.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

    assert!(!accepted);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reset_accepts_new_work() {
    let pool = Pool::new(bounded(3));
    let done = Arc::new(AtomicUsize::new(0));

    for round in 1..=3 {
        for _ in 0..10 {
            let d = Arc::clone(&done);
            assert!(
                pool.go(async move {
                    d.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .await
            );
        }
        pool.reset().await;
        assert!(!pool.is_stopped());
        assert!(!pool.is_cancelled());
        assert_eq!(done.load(Ordering::SeqCst), round * 10);
    }
    pool.wait().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_one_panic_among_healthy_tasks() {
    const HEALTHY: usize = 25;
    let panics = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicUsize::new(0));

    let p = Arc::clone(&panics);
    let pool = Pool::builder(bounded(4))
        .with_panic_handler(move |rec| {
            assert_eq!(rec.value(), "task 7 exploded");
            p.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    for i in 0..=HEALTHY {
        let d = Arc::clone(&done);
        pool.go(async move {
            if i == 7 {
                panic!("task {i} exploded");
            }
            d.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;
    }
    pool.wait().await;

    assert_eq!(done.load(Ordering::SeqCst), HEALTHY);
    assert_eq!(panics.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_every_error_is_reported() {
    let errors = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let e = Arc::clone(&errors);
    let pool = Pool::builder(Config::default())
        .with_max_concurrent(5)
        .with_error_handler(move |err| e.lock().push(err.to_string()))
        .build();

    for i in 0..20 {
        pool.go(async move {
            if i % 4 == 0 {
                return Err(TaskError::fail(format!("failed {i}")));
            }
            Ok(())
        })
        .await;
    }
    pool.wait().await;

    let mut got = errors.lock().clone();
    got.sort();
    assert_eq!(got, vec!["failed 0", "failed 12", "failed 16", "failed 4", "failed 8"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tasks_observe_cancellation() {
    let pool = Arc::new(Pool::new(bounded(2)));
    let token = pool.token();
    let saw_cancel = Arc::new(AtomicUsize::new(0));

    let s = Arc::clone(&saw_cancel);
    pool.go(async move {
        token.cancelled().await;
        s.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .await;

    pool.cancel();
    assert!(!pool.go(async { Ok(()) }).await);
    pool.wait().await;
    assert_eq!(saw_cancel.load(Ordering::SeqCst), 1);
}
