//! Stop signals for an open microphone capture

use std::future::{pending, Future};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::domain::capture::CaptureLimit;

/// Why the user's capture ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Enter pressed; send what was captured
    Confirmed,
    /// Ctrl-C; discard the capture
    Cancelled,
    /// `max_duration` elapsed; send what was captured
    LimitReached,
}

impl StopReason {
    /// Whether the captured media should go on to inference
    pub fn keeps_media(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Wait for Enter on stdin, Ctrl-C, or the capture limit.
///
/// A closed stdin never confirms, so piped runs stop at the limit.
pub async fn wait_for_stop(limit: CaptureLimit) -> StopReason {
    // Detached thread: a pending read must not hold the runtime open on exit.
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        if matches!(std::io::stdin().read_line(&mut line), Ok(n) if n > 0) {
            let _ = tx.send(());
        }
    });
    let enter = async {
        if rx.await.is_err() {
            pending::<()>().await;
        }
    };
    let cancel = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            pending::<()>().await;
        }
    };
    first_stop(enter, cancel, limit.as_std()).await
}

async fn first_stop<E, C>(enter: E, cancel: C, limit: Duration) -> StopReason
where
    E: Future<Output = ()>,
    C: Future<Output = ()>,
{
    tokio::select! {
        _ = cancel => StopReason::Cancelled,
        _ = enter => StopReason::Confirmed,
        _ = tokio::time::sleep(limit) => StopReason::LimitReached,
    }
}
