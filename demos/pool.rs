//! # Example: pool
//!
//! Runs 20 jobs on a pool capped at 4 workers. Every fifth job fails and one
//! panics; the pool keeps going and reports both through its handlers.
//!
//! ## Flow
//! ```text
//! Pool::builder(cfg) ──► go(job) × 20
//!     ├─► workers ≤ 4, reused while the queue has work
//!     ├─► Err   ──► log_error
//!     └─► panic ──► log_panic
//! wait() ──► all jobs done, workers joined
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example pool
//! ```

use std::time::Duration;

use taskwork::{Config, Pool, TaskError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = Config {
        max_concurrent: 4,
        ..Config::default()
    };
    let pool = Pool::builder(cfg)
        .with_error_handler(taskwork::log_error)
        .build();

    for id in 0..20u64 {
        pool.go(async move {
            tokio::time::sleep(Duration::from_millis(20 * (id % 3))).await;
            match id {
                13 => panic!("job {id} hit a bug"),
                id if id % 5 == 0 => Err(TaskError::fail(format!("job {id} failed"))),
                _ => {
                    println!("[job {id}] done");
                    Ok(())
                }
            }
        })
        .await;
    }

    pool.wait().await;
    println!("all jobs finished");
    Ok(())
}
