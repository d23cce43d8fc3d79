//! # Panic-safe task launcher.
//!
//! [`WaitGroup`] is the base primitive of the crate: pools use one to track
//! their workers, streams one for the ordering reader, task groups one per run.
//!
//! ```text
//! go(fut) ──► running += 1 ──► tokio::spawn(catch(fut))
//!                                   ├─ Ok        ──► running -= 1
//!                                   └─ Recovered ──► PanicHandler, running -= 1
//! wait()  ──► suspend until running == 0
//! ```
//!
//! ## Rules
//! - A panic never escapes the spawned task; it is handed to the panic handler.
//! - `wait` may be called any number of times, concurrently too.
//! - `go` after `wait` is allowed: the new task is joined by a later `wait`.

mod wait_group;

pub use wait_group::WaitGroup;
