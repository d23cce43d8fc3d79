//! # Fail-fast variants.
//!
//! [`FailFastPool`] and [`FailFastStream`] wrap their core component and add
//! first-failure capture:
//!
//! ```text
//! failure ──► gate (CAS) ──won──► store error ──► send on channel ──► cancel inner
//!                 │
//!                 └──lost──► ignored by the gate
//! every failure ──► caller's handlers (if configured)
//! ```
//!
//! ## Rules
//! - Panics are captured as [`TaskError::Panicked`](crate::TaskError::Panicked).
//! - The channel yields the first failure exactly once, or closes on `wait`.
//! - `reset` clears the gate, the stored error and the channel.

mod first;
mod pool;
mod stream;

pub use pool::FailFastPool;
pub use stream::FailFastStream;
