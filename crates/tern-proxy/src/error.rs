//! Gateway failure mapping
//!
//! Every failure becomes a JSON body with a status code; nothing escapes as
//! a bare 500.

use tern_protocol::Provider;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Origin not allowed.")]
    OriginNotAllowed,

    #[error("Method not allowed.")]
    MethodNotAllowed,

    #[error("Invalid JSON payload.")]
    InvalidJson,

    #[error("{0}")]
    InvalidMessages(&'static str),

    /// Missing environment configuration; names the variable.
    #[error("Missing {0} in gateway environment.")]
    MissingConfig(&'static str),

    #[error("Invalid ANTHROPIC_COMPAT_BASE_URL.")]
    InvalidCompatBaseUrl,

    /// Upstream answered with a non-success status; relayed with detail.
    #[error("{provider} upstream error")]
    Upstream {
        provider: Provider,
        status: u16,
        detail: String,
    },

    #[error("{0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> u16 {
        match self {
            Self::OriginNotAllowed => 403,
            Self::MethodNotAllowed => 405,
            Self::InvalidJson | Self::InvalidMessages(_) => 400,
            Self::MissingConfig(_) | Self::InvalidCompatBaseUrl | Self::Internal(_) => 500,
            Self::Upstream { status, .. } => *status,
        }
    }

    /// JSON body for the error response.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            Self::Upstream { detail, .. } => serde_json::json!({
                "error": self.to_string(),
                "detail": detail,
            }),
            other => serde_json::json!({ "error": other.to_string() }),
        }
    }
}
