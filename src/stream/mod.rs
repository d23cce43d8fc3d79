//! # Order-preserving two-phase pipeline.
//!
//! A [`Stream`] task runs in two phases: phase one concurrently on a
//! [`Pool`](crate::Pool), then an optional [`Callback`] that runs strictly in
//! submission order on a single reader task.
//!
//! ```text
//! go(task) ──► slot = SlotPool::acquire()
//!          ──► ordering_queue.send(slot)                (FIFO)
//!          ──► pool.go( slot.fulfill(catch(task)) )      (any order)
//!
//! reader: for slot in ordering_queue {
//!     match slot.wait() {
//!         Panicked  ─► panic handler
//!         Failed    ─► error handler
//!         Rejected  ─► skip
//!         Done(cb)  ─► unless cancelled: cb.await, Err ─► error handler
//!     }
//! }
//! ```
//!
//! ## Rules
//! - Every pushed slot is fulfilled exactly once, by the worker or, when the
//!   pool refuses the task, by `go` itself.
//! - A panic in a callback or a handler is caught; the reader keeps going.
//! - `wait` waits the pool, closes the ordering queue and joins the reader.

mod builder;
mod callback;
mod completion;
mod core;

pub use builder::StreamBuilder;
pub use callback::Callback;
pub use self::core::Stream;
