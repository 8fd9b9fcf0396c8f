//! Token and error extraction from per-event JSON payloads
//!
//! Payload shapes differ per provider; both functions probe the union of
//! known shapes in a fixed order so a payload carrying more than one field
//! resolves the same way everywhere.

use serde_json::Value;

/// Detect an embedded upstream error. Checked before token extraction; any
/// match aborts the stream with the returned message.
pub fn error_message(payload: &Value) -> Option<String> {
    match payload.get("error") {
        Some(Value::String(message)) if !message.trim().is_empty() => {
            return Some(message.clone());
        }
        Some(Value::Object(error)) => {
            if let Some(Value::String(message)) = error.get("message") {
                if !message.trim().is_empty() {
                    return Some(message.clone());
                }
            }
            if let Some(Value::String(detail)) = error.get("error") {
                if !detail.trim().is_empty() {
                    return Some(detail.clone());
                }
            }
        }
        _ => {}
    }

    if payload.get("type").and_then(Value::as_str) == Some("error") {
        if let Some(message) = payload.get("message").and_then(Value::as_str) {
            if !message.trim().is_empty() {
                return Some(message.to_string());
            }
        }
    }

    None
}

/// Extract the incremental text for one event, or `None` when the event
/// carries no token (metadata, pings).
///
/// Precedence, first match wins: top-level string `token`; top-level string
/// `delta`; OpenAI `choices[0].delta.content`; Anthropic `delta.text` when
/// the SSE event name or the payload `type` is `content_block_delta`.
pub fn token(payload: &Value, event_name: Option<&str>) -> Option<String> {
    if let Some(token) = payload.get("token").and_then(Value::as_str) {
        return Some(token.to_string());
    }

    if let Some(delta) = payload.get("delta").and_then(Value::as_str) {
        return Some(delta.to_string());
    }

    if let Some(content) = payload
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(Value::as_str)
    {
        return Some(content.to_string());
    }

    let block_delta = event_name == Some("content_block_delta")
        || payload.get("type").and_then(Value::as_str) == Some("content_block_delta");
    if block_delta {
        if let Some(text) = payload
            .get("delta")
            .and_then(|delta| delta.get("text"))
            .and_then(Value::as_str)
        {
            return Some(text.to_string());
        }
    }

    None
}
