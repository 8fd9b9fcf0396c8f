//! Failure taxonomy for streamed chat calls

use tern_protocol::Provider;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Missing or unusable local configuration; raised before any network
    /// I/O and never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Upstream answered with a non-success status.
    #[error("{provider} upstream error ({status}): {detail}")]
    UpstreamHttp {
        provider: Provider,
        status: u16,
        detail: String,
    },

    /// The SSE payload itself carried an error; aborts the stream.
    #[error("upstream error: {0}")]
    UpstreamPayload(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Body read failed mid-stream.
    #[error("stream error: {0}")]
    Stream(String),

    /// The request was aborted through its cancellation token. `timed_out`
    /// distinguishes a deadline expiry from a caller-initiated abort.
    #[error("request {}", if *timed_out { "timed out" } else { "cancelled" })]
    Cancelled { timed_out: bool },
}

impl ProviderError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// True only for the timeout-tagged flavor of cancellation.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Cancelled { timed_out: true })
    }
}
