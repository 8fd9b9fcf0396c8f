//! Provider-keyed construction of upstream HTTP requests
//!
//! Each provider's URL shape, body shape, and auth convention lives in its
//! own module; this one only dispatches on the provider tag and holds the
//! header helpers they share.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tern_protocol::{ChatMessage, Provider};

use crate::config::ProviderEndpoints;
use crate::{anthropic, compat, openai, ProviderError};

/// A fully built upstream request, ready to POST.
#[derive(Debug)]
pub struct WireRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Build the upstream request for one provider. Fails with a configuration
/// error (missing credential, bad base URL) before any network I/O happens.
pub fn build(
    provider: Provider,
    endpoints: &ProviderEndpoints,
    model: &str,
    messages: &[ChatMessage],
) -> Result<WireRequest, ProviderError> {
    match provider {
        Provider::OpenAI => openai::build_request(&endpoints.openai, model, messages),
        Provider::Anthropic => anthropic::build_request(&endpoints.anthropic, model, messages),
        Provider::AnthropicCompatible => compat::build_request(&endpoints.compat, model, messages),
    }
}

/// Headers common to every streaming upstream call.
pub(crate) fn sse_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    headers
}

pub(crate) fn bearer_value(key: &SecretString) -> Result<HeaderValue, ProviderError> {
    secret_header(&format!("Bearer {}", key.expose_secret()))
}

pub(crate) fn api_key_value(key: &SecretString) -> Result<HeaderValue, ProviderError> {
    secret_header(key.expose_secret())
}

fn secret_header(raw: &str) -> Result<HeaderValue, ProviderError> {
    let mut value = HeaderValue::from_str(raw)
        .map_err(|_| ProviderError::Configuration("invalid API key format".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

pub(crate) fn encode_body<T: serde::Serialize>(body: &T) -> Result<Value, ProviderError> {
    serde_json::to_value(body)
        .map_err(|e| ProviderError::Configuration(format!("failed to encode request body: {e}")))
}
