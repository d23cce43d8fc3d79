//! # Example: task_group
//!
//! Three actors that stop together: an OS signal listener, a worker that runs
//! until interrupted, and a job that fails after five seconds. Press Ctrl-C
//! before that to see the signal outcome instead.
//!
//! ## Flow
//! ```text
//! TaskGroup::run()
//!     ├─► SignalHandler      (SIGINT / SIGTERM)
//!     ├─► worker(token)      (ticks until token cancelled)
//!     └─► job                (fails after 5s)
//! first outcome ──► interrupt all ──► wait all ──► return it
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example task_group
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use taskwork::{Signal, SignalHandler, TaskError, TaskGroup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let root = CancellationToken::new();
    let mut group = TaskGroup::new();

    group.add_actor(SignalHandler::new(&root, &Signal::DEFAULT));
    println!("waiting 5 seconds; press Ctrl-C to exit early");

    group.add_context(
        |token| async move {
            let mut tick = tokio::time::interval(Duration::from_secs(1));
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tick.tick() => println!("[worker] working..."),
                }
            }
            println!("[worker] stopped");
            Ok(())
        },
        |_, reason| println!("[worker] interrupted: {reason:?}"),
    );

    group.add(
        || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(TaskError::fail("job gave up"))
        },
        |_| println!("[job] interrupted"),
    );

    match group.run().await {
        Ok(()) => println!("group finished"),
        Err(err) if err.is_signal() => println!("stopped by signal: {err}"),
        Err(err) => println!("group failed: {err}"),
    }
    Ok(())
}
