//! OpenAI chat-completions wire adapter

use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use tern_protocol::ChatMessage;

use crate::config::{EndpointConfig, DEFAULT_OPENAI_BASE_URL};
use crate::wire::{self, WireRequest};
use crate::ProviderError;

const TEMPERATURE: f32 = 0.4;

/// Messages go through unchanged; OpenAI accepts system turns inline.
#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    stream: bool,
    temperature: f32,
    messages: &'a [ChatMessage],
}

pub(crate) fn build_request(
    config: &EndpointConfig,
    model: &str,
    messages: &[ChatMessage],
) -> Result<WireRequest, ProviderError> {
    let api_key = config.api_key.as_ref().ok_or_else(|| {
        ProviderError::Configuration("missing OpenAI API key".to_string())
    })?;

    let base = config
        .base_url
        .as_deref()
        .unwrap_or(DEFAULT_OPENAI_BASE_URL)
        .trim_end_matches('/');
    let url = format!("{base}/chat/completions");

    let mut headers = wire::sse_headers();
    headers.insert(AUTHORIZATION, wire::bearer_value(api_key)?);

    let body = wire::encode_body(&OpenAiRequest {
        model,
        stream: true,
        temperature: TEMPERATURE,
        messages,
    })?;

    Ok(WireRequest { url, headers, body })
}
