//! # Panic recovery.
//!
//! Every component boundary that can observe a panic (worker jobs, stream
//! callbacks, group tasks, actors) funnels it through [`catch`] and hands the
//! resulting [`Recovered`] to a panic handler instead of unwinding further.
//!
//! ```text
//! user future ──► catch() ──► Ok(output)
//!                     └─────► Err(Recovered) ──► PanicHandler / TaskError::Panicked
//! ```

mod catch;
mod recovered;

pub use catch::{catch, catch_blocking};
pub use recovered::{Recovered, RecoveredError};
