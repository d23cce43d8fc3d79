//! # taskwork
//!
//! **Taskwork** is a small set of composable concurrency primitives for tokio:
//! panic-safe task launching, bounded worker pools, order-preserving two-phase
//! streams and actor groups that shut down together.
//!
//! ## Architecture
//! ```text
//!            ┌───────────────────────────┐
//!            │ panics: catch / Recovered │  every boundary below routes
//!            └─────────────┬─────────────┘  panics through it
//!                          ▼
//!            ┌───────────────────────────┐
//!            │ WaitGroup                 │  spawn + join + panic handler
//!            └──────┬─────────────┬──────┘
//!                   ▼             ▼
//!    ┌──────────────────────┐   ┌──────────────────────────────┐
//!    │ Pool                 │   │ TaskGroup                    │
//!    │ - lazy workers ≤ max │   │ - (execute, interrupt) pairs │
//!    │ - task queue         │   │ - first outcome stops all    │
//!    │ - limiter (permits)  │   │ - ContextHandler             │
//!    └──────────┬───────────┘   │ - SignalHandler              │
//!               ▼               └──────────────────────────────┘
//!    ┌──────────────────────┐
//!    │ Stream               │
//!    │ - phase one on Pool  │
//!    │ - ordered callbacks  │
//!    └──────────┬───────────┘
//!               ▼
//!    FailFastPool / FailFastStream   (first failure ─► channel + cancel)
//! ```
//!
//! ### Lifecycle (Pool / Stream)
//! ```text
//! Running ──wait()──► Stopped ──reset()──► Running (new generation)
//!    │                   ▲
//!    └──cancel()─────────┘ go() returns false from here on; wait() still drains
//! ```
//!
//! ## Features
//! | Area              | Description                                             | Key types                               |
//! |-------------------|---------------------------------------------------------|-----------------------------------------|
//! | **Panics**        | Catch panics as structured values.                      | [`Recovered`], [`catch`]                |
//! | **Launching**     | Spawn and join with panic routing.                      | [`WaitGroup`]                           |
//! | **Pools**         | Bounded, lazily grown worker pool.                      | [`Pool`], [`PoolBuilder`]               |
//! | **Streams**       | Concurrent work, callbacks in submission order.         | [`Stream`], [`Callback`]                |
//! | **Actors**        | Run together, stop together.                            | [`TaskGroup`], [`Actor`]                |
//! | **Fail-fast**     | First failure captured, component cancelled.            | [`FailFastPool`], [`FailFastStream`]    |
//! | **Errors**        | Typed errors for task outcomes.                         | [`TaskError`]                           |
//! | **Configuration** | Sizing knobs shared by pools and streams.               | [`Config`]                              |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use taskwork::{Callback, Config, Pool, Stream, TaskError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cfg = Config { max_concurrent: 4, ..Config::default() };
//!
//!     // Pool: at most 4 tasks at once.
//!     let done = Arc::new(AtomicUsize::new(0));
//!     let pool = Pool::builder(cfg.clone())
//!         .with_error_handler(taskwork::log_error)
//!         .build();
//!     for _ in 0..10 {
//!         let done = done.clone();
//!         pool.go(async move {
//!             done.fetch_add(1, Ordering::SeqCst);
//!             Ok::<_, TaskError>(())
//!         })
//!         .await;
//!     }
//!     pool.wait().await;
//!     assert_eq!(done.load(Ordering::SeqCst), 10);
//!
//!     // Stream: callbacks print 0..10 in order.
//!     let stream = Stream::new(cfg);
//!     for i in 0..10 {
//!         stream
//!             .go(async move {
//!                 Ok(Some(Callback::from_fn(move || {
//!                     println!("{i}");
//!                     Ok(())
//!                 })))
//!             })
//!             .await;
//!     }
//!     stream.wait().await;
//! }
//! ```
mod config;
mod error;
mod fail_fast;
mod group;
mod handlers;
mod panics;
mod pool;
mod stream;
mod taskgroup;

// ---- Public re-exports ----

pub use config::Config;
pub use error::{BoxError, SharedError, TaskError};
pub use fail_fast::{FailFastPool, FailFastStream};
pub use group::WaitGroup;
pub use handlers::{ErrorHandler, PanicHandler, log_error, log_panic};
pub use panics::{Recovered, RecoveredError, catch, catch_blocking};
pub use pool::{Pool, PoolBuilder};
pub use stream::{Callback, Stream, StreamBuilder};
pub use taskgroup::{
    Actor, ContextHandler, Signal, SignalHandler, TaskGroup, skip_interrupt, skip_interrupt_ctx,
};
