//! # OS signal actor.
//!
//! [`SignalHandler`] ends a [`TaskGroup`](crate::TaskGroup) run when the process
//! receives one of the listed signals.
//!
//! ## Signals
//! **Unix platforms:** every [`Signal`] maps to its `SIG*` counterpart.
//!
//! **Other platforms:** only [`Signal::Interrupt`] is observed, via
//! [`tokio::signal::ctrl_c`]; the other variants never fire.
//!
//! Listeners are registered when `execute` starts and dropped when it returns.

use std::fmt;
use std::io;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::actor::Actor;
use crate::error::TaskError;

/// Termination signals a [`SignalHandler`] can listen for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// `SIGINT` (Ctrl-C in terminal).
    Interrupt,
    /// `SIGTERM` (default kill signal, used by systemd/Kubernetes).
    Terminate,
    /// `SIGQUIT`.
    Quit,
    /// `SIGHUP`.
    Hangup,
}

impl Signal {
    /// Signals used when none are given: interrupt and terminate.
    pub const DEFAULT: [Signal; 2] = [Signal::Interrupt, Signal::Terminate];

    /// Returns a short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Interrupt => "interrupt",
            Signal::Terminate => "terminate",
            Signal::Quit => "quit",
            Signal::Hangup => "hangup",
        }
    }

    #[cfg(unix)]
    fn kind(self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind;

        match self {
            Signal::Interrupt => SignalKind::interrupt(),
            Signal::Terminate => SignalKind::terminate(),
            Signal::Quit => SignalKind::quit(),
            Signal::Hangup => SignalKind::hangup(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actor that terminates the group on an OS signal or token cancellation.
///
/// # Example
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use taskwork::{Signal, SignalHandler, TaskGroup};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut group = TaskGroup::new();
/// group.add_actor(SignalHandler::new(&CancellationToken::new(), &Signal::DEFAULT));
///
/// let outcome = group.run().await;
/// assert!(outcome.is_err_and(|e| e.is_signal()));
/// # }
/// ```
pub struct SignalHandler {
    token: CancellationToken,
    signals: Vec<Signal>,
}

impl SignalHandler {
    /// Listens for `signals` ([`Signal::DEFAULT`] if empty) until a child of
    /// `parent` is cancelled.
    pub fn new(parent: &CancellationToken, signals: &[Signal]) -> Self {
        let signals = if signals.is_empty() {
            Signal::DEFAULT.to_vec()
        } else {
            signals.to_vec()
        };
        Self {
            token: parent.child_token(),
            signals,
        }
    }

    /// Signals this handler listens for.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }
}

#[async_trait]
impl Actor for SignalHandler {
    async fn execute(&self, token: CancellationToken) -> Result<(), TaskError> {
        let mut listener = Listener::register(&self.signals).map_err(TaskError::fail)?;

        tokio::select! {
            signal = listener.recv() => {
                tracing::debug!(%signal, "signal received");
                Err(TaskError::Signal { signal })
            }
            _ = self.token.cancelled() => Err(TaskError::Canceled),
            _ = token.cancelled() => Err(TaskError::Canceled),
        }
    }

    fn interrupt(&self, token: &CancellationToken, _reason: Option<&TaskError>) {
        token.cancel();
    }
}

/// Registered OS signal listeners.
#[cfg(unix)]
struct Listener {
    streams: Vec<(Signal, tokio::signal::unix::Signal)>,
}

#[cfg(unix)]
impl Listener {
    fn register(signals: &[Signal]) -> io::Result<Self> {
        let streams = signals
            .iter()
            .map(|&sig| tokio::signal::unix::signal(sig.kind()).map(|stream| (sig, stream)))
            .collect::<io::Result<Vec<_>>>()?;
        Ok(Self { streams })
    }

    async fn recv(&mut self) -> Signal {
        if self.streams.is_empty() {
            return std::future::pending().await;
        }
        let waits = self.streams.iter_mut().map(|(sig, stream)| {
            let sig = *sig;
            Box::pin(async move {
                stream.recv().await;
                sig
            })
        });
        let (sig, _, _) = futures::future::select_all(waits).await;
        sig
    }
}

#[cfg(not(unix))]
struct Listener {
    ctrl_c: bool,
}

#[cfg(not(unix))]
impl Listener {
    fn register(signals: &[Signal]) -> io::Result<Self> {
        Ok(Self {
            ctrl_c: signals.contains(&Signal::Interrupt),
        })
    }

    async fn recv(&mut self) -> Signal {
        if self.ctrl_c && tokio::signal::ctrl_c().await.is_ok() {
            return Signal::Interrupt;
        }
        std::future::pending().await
    }
}
