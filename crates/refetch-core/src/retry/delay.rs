//! Inter-attempt wait that gives up as soon as the caller cancels.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The wait was cut short by the cancellation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Sleeps for `duration`, or returns `Err(Cancelled)` as soon as `signal` fires.
///
/// Both the timer and the cancellation listener are owned by this future and
/// dropped when it completes, on either path.
pub async fn sleep_or_cancel(
    duration: Duration,
    signal: Option<&CancellationToken>,
) -> Result<(), Cancelled> {
    let Some(signal) = signal else {
        tokio::time::sleep(duration).await;
        return Ok(());
    };
    if signal.is_cancelled() {
        return Err(Cancelled);
    }
    tokio::select! {
        _ = signal.cancelled() => Err(Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
