//! Common types shared by the streaming client and the relay

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Upstream wire protocol selector.
///
/// Exactly one provider is active per request; it decides the endpoint
/// shape, auth convention, and streaming payload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAI,
    Anthropic,
    #[serde(rename = "anthropic-compatible")]
    AnthropicCompatible,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::AnthropicCompatible => write!(f, "anthropic-compatible"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct ParseProviderError(String);

impl FromStr for Provider {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "anthropic-compatible" => Ok(Self::AnthropicCompatible),
            other => Err(ParseProviderError(other.to_string())),
        }
    }
}

/// Terminal success value of one streamed chat call.
///
/// `text` is exactly the in-order concatenation of every token delivered to
/// the caller's callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamResult {
    pub provider: Provider,
    pub model: String,
    pub text: String,
}
