//! # Example: fail_fast
//!
//! Uploads a batch of files; the first failure cancels the rest of the batch
//! and is reported once through the error channel.
//!
//! ## Flow
//! ```text
//! go(upload i) ──► Err on file 7 ──► gate: store, send, cancel pool
//!                                      └─► later go() calls return false
//! wait() ──► error channel yields "file 7 rejected"
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example fail_fast
//! ```

use std::time::Duration;

use taskwork::{Config, Pool, TaskError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let pool = Pool::builder(Config::default())
        .with_max_concurrent(3)
        .build_fail_fast();
    let first_error = pool
        .take_error_channel()
        .ok_or_else(|| anyhow::anyhow!("error channel already taken"))?;

    for file in 0..20u32 {
        let token = pool.token();
        let accepted = pool
            .go(async move {
                tokio::select! {
                    _ = token.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(Duration::from_millis(50)) => {}
                }
                if file == 7 {
                    return Err(TaskError::fail(format!("file {file} rejected")));
                }
                println!("[upload] file {file} stored");
                Ok(())
            })
            .await;
        if !accepted {
            println!("[upload] batch cancelled at file {file}");
            break;
        }
    }

    pool.wait().await;
    match first_error.await {
        Ok(err) => println!("batch failed: {err}"),
        Err(_) => println!("batch succeeded"),
    }
    Ok(())
}
