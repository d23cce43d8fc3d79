//! Panic interception helpers.
//!
//! Both helpers use `AssertUnwindSafe`: state shared with the caught code
//! (e.g. `Arc<Mutex<T>>` locked during the panic) may be left inconsistent.
//! The recorded backtrace points at the helper's caller, since it is taken
//! once unwinding has reached the helper.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use super::recovered::Recovered;

/// Frames belonging to the capture itself (`Backtrace::force_capture`, `Recovered::new`).
const CAPTURE_FRAMES: usize = 2;

/// Awaits `future`, converting a panic raised while polling it into [`Recovered`].
///
/// # Example
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let caught = taskwork::catch(async {
///     if true {
///         panic!("boom");
///     }
/// })
/// .await;
/// let recovered: taskwork::Recovered = caught.unwrap_err();
/// assert_eq!(recovered.value(), "boom");
/// # }
/// ```
pub async fn catch<F>(future: F) -> Result<F::Output, Recovered>
where
    F: Future,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|payload| Recovered::new(CAPTURE_FRAMES, payload))
}

/// Runs `f`, converting a panic into [`Recovered`].
pub fn catch_blocking<F, R>(f: F) -> Result<R, Recovered>
where
    F: FnOnce() -> R,
{
    std::panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| Recovered::new(CAPTURE_FRAMES, payload))
}
