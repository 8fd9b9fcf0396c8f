//! Cooperative cancellation with a timeout marker

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Clonable cancellation handle for an in-flight stream.
///
/// A caller-imposed timeout rides the same signal: the timer fires
/// [`CancelToken::cancel_for_timeout`], which marks the token before
/// cancelling so observers can tell "user closed the chat" apart from
/// "request took too long".
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    token: CancellationToken,
    timed_out: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel on behalf of the caller.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancel because a deadline expired. The timed-out marker is set before
    /// the token fires, so a cancelled token is never observed without it.
    pub fn cancel_for_timeout(&self) {
        self.timed_out.store(true, Ordering::SeqCst);
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out.load(Ordering::SeqCst)
    }

    /// Resolves once the token is cancelled through either path.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
