//! Anthropic-compatible wire adapter
//!
//! Third-party endpoints that speak the Messages wire format but live at a
//! configurable base URL, with a switchable auth header convention.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use url::Url;

use crate::config::{AuthMode, CompatConfig};
use crate::wire::{self, WireRequest};
use crate::{anthropic, ProviderError};
use tern_protocol::ChatMessage;

/// Derive the Messages endpoint from a configured base URL.
///
/// Trailing slashes are stripped. A base already ending in `/v1/messages` or
/// `/messages` is used as-is; one ending in `/v1` gets `/messages` appended;
/// anything else gets `/v1/messages`.
pub fn messages_endpoint(base_url: &str) -> String {
    let normalized = base_url.trim().trim_end_matches('/');
    if normalized.is_empty() {
        return String::new();
    }
    if normalized.ends_with("/v1/messages") || normalized.ends_with("/messages") {
        return normalized.to_string();
    }
    if normalized.ends_with("/v1") {
        return format!("{normalized}/messages");
    }
    format!("{normalized}/v1/messages")
}

pub(crate) fn build_request(
    config: &CompatConfig,
    model: &str,
    messages: &[ChatMessage],
) -> Result<WireRequest, ProviderError> {
    let api_key = config.api_key.as_ref().ok_or_else(|| {
        ProviderError::Configuration("missing Anthropic-compatible API key".to_string())
    })?;
    let base = config.base_url.as_deref().ok_or_else(|| {
        ProviderError::Configuration("missing Anthropic-compatible base URL".to_string())
    })?;

    let endpoint = messages_endpoint(base);
    if endpoint.is_empty() || Url::parse(&endpoint).is_err() {
        return Err(ProviderError::Configuration(
            "invalid Anthropic-compatible base URL".to_string(),
        ));
    }

    let mut headers = wire::sse_headers();
    match config.auth_mode {
        AuthMode::XApiKey => {
            headers.insert("x-api-key", wire::api_key_value(api_key)?);
        }
        AuthMode::Bearer => {
            headers.insert(AUTHORIZATION, wire::bearer_value(api_key)?);
        }
    }
    if let Some(version) = &config.version {
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(version).map_err(|_| {
                ProviderError::Configuration("invalid anthropic-version value".to_string())
            })?,
        );
    }

    let body = wire::encode_body(&anthropic::build_body(model, messages))?;

    Ok(WireRequest {
        url: endpoint,
        headers,
        body,
    })
}
