//! # Actor group.
//!
//! [`TaskGroup`] runs a fixed set of [`Actor`]s and tears all of them down as
//! soon as one finishes.
//!
//! ```text
//! run()
//!   ├─► token_i = CancellationToken::new()        (one per actor, per run)
//!   ├─► spawn execute_i(token_i)                  (panic ─► TaskError::Panicked)
//!   ├─► first = first outcome received
//!   ├─► interrupt_i(token_i, first.err())         (every actor)
//!   ├─► wait for every execute_i
//!   └─► return first
//! ```
//!
//! Built-in actors: [`ContextHandler`] (external cancellation) and
//! [`SignalHandler`] (OS signals).

mod actor;
mod context;
mod core;
mod signal;

pub use actor::{Actor, skip_interrupt, skip_interrupt_ctx};
pub use context::ContextHandler;
pub use self::core::TaskGroup;
pub use signal::{Signal, SignalHandler};
