//! # Bounded worker pool.
//!
//! [`Pool`] runs submitted futures on workers that are spawned on demand, up
//! to `max_concurrent`, and reused while there is queued work.
//!
//! ## Admission
//! ```text
//! go(task)
//!   ├─ token cancelled / queue closed ──► false
//!   ├─ idle worker?   ──► try_send(task) ──► true
//!   ├─ free permit?   ──► spawn worker(task, permit) ──► true
//!   └─ select! (biased)
//!        ├─ cancelled       ──► false
//!        ├─ permit acquired ──► spawn worker(task, permit) ──► true
//!        └─ queue reserved  ──► enqueue(task) ──► true
//!
//! worker(first, permit):
//!   run(first)
//!   loop { idle += 1; recv() ; idle -= 1 }   // until the queue is closed and drained
//!   drop(permit)
//! ```
//!
//! ## Rules
//! - Every worker owns one permit for its whole life, so live workers never
//!   exceed the ceiling.
//! - A task error goes to the error handler; a panic (in the task or in the
//!   error handler) goes to the panic handler. Neither stops the pool.
//! - `wait` is one-shot: cancel, close the queue, join workers, close the limiter.
//! - `reset` starts a new generation derived from the original parent token.

mod builder;
mod core;
mod limiter;
mod worker;

pub use builder::PoolBuilder;
pub use self::core::Pool;
