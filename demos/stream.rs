//! # Example: stream
//!
//! Fetches "pages" concurrently (random latency) and prints them in the order
//! they were requested.
//!
//! ## Flow
//! ```text
//! go(fetch page i) ──► pool: sleep(random) ──► Callback(print page i)
//! reader           ──► print page 0, 1, 2, ... (submission order)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example stream
//! ```

use std::time::Duration;

use rand::Rng;
use taskwork::{Callback, Config, Stream};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let stream = Stream::builder(Config::default())
        .with_max_concurrent(8)
        .with_error_handler(taskwork::log_error)
        .build();

    for page in 0..16u32 {
        let latency = rand::rng().random_range(10..200u64);
        stream
            .go(async move {
                tokio::time::sleep(Duration::from_millis(latency)).await;
                let body = format!("page {page} ({latency} ms)");
                Ok(Some(Callback::from_fn(move || {
                    println!("{body}");
                    Ok(())
                })))
            })
            .await;
    }

    stream.wait().await;
    Ok(())
}
