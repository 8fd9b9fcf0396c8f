//! Anthropic Messages wire adapter

use reqwest::header::HeaderValue;
use serde::Serialize;
use tern_protocol::{ChatMessage, Role};

use crate::config::{EndpointConfig, DEFAULT_ANTHROPIC_BASE_URL};
use crate::wire::{self, WireRequest};
use crate::ProviderError;

pub(crate) const ANTHROPIC_VERSION: &str = "2023-06-01";

const TEMPERATURE: f32 = 0.4;
const MAX_TOKENS: usize = 1024;

#[derive(Debug, Serialize)]
pub(crate) struct AnthropicRequest {
    model: String,
    stream: bool,
    max_tokens: usize,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage {
    role: &'static str,
    content: String,
}

/// Pull system turns out of the conversation and merge them into the single
/// `system` parameter the Messages API expects. Order among system messages
/// is preserved; multiple are joined by a blank line.
pub(crate) fn extract_system(messages: &[ChatMessage]) -> (Option<String>, Vec<WireMessage>) {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();
    let system = if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    };

    let conversation = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| WireMessage {
            role: if m.role == Role::Assistant {
                "assistant"
            } else {
                "user"
            },
            content: m.content.clone(),
        })
        .collect();

    (system, conversation)
}

pub(crate) fn build_body(model: &str, messages: &[ChatMessage]) -> AnthropicRequest {
    let (system, conversation) = extract_system(messages);
    AnthropicRequest {
        model: model.to_string(),
        stream: true,
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
        system,
        messages: conversation,
    }
}

pub(crate) fn build_request(
    config: &EndpointConfig,
    model: &str,
    messages: &[ChatMessage],
) -> Result<WireRequest, ProviderError> {
    let api_key = config.api_key.as_ref().ok_or_else(|| {
        ProviderError::Configuration("missing Anthropic API key".to_string())
    })?;

    let base = config
        .base_url
        .as_deref()
        .unwrap_or(DEFAULT_ANTHROPIC_BASE_URL)
        .trim_end_matches('/');
    let url = format!("{base}/messages");

    let mut headers = wire::sse_headers();
    headers.insert("x-api-key", wire::api_key_value(api_key)?);
    headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));

    let body = wire::encode_body(&build_body(model, messages))?;

    Ok(WireRequest { url, headers, body })
}
