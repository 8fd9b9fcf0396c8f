//! End-to-end streamed chat calls
//!
//! One [`LlmClient`] call drives a single request: build the wire request
//! (or a relay request when a gateway is configured), POST it, walk the SSE
//! body, and hand each text delta to the caller's callback in arrival order.
//! Reads are sequential; independent calls share nothing but the connection
//! pool.

use futures::StreamExt;
use secrecy::ExposeSecret;
use serde::Serialize;
use tern_protocol::{CancelToken, ChatMessage, Provider, StreamResult};

use crate::sse::{SseEvent, SseParser};
use crate::{extract, wire, ClientConfig, ProviderError};

/// Inputs for one streamed chat call. Constructed per call, not reused.
#[derive(Debug, Default)]
pub struct StreamRequest {
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub cancel: Option<CancelToken>,
}

impl StreamRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Body sent to a relay gateway, which performs its own adapter selection.
#[derive(Debug, Serialize)]
struct RelayBody<'a> {
    provider: Provider,
    model: &'a str,
    stream: bool,
    messages: &'a [ChatMessage],
}

/// Streaming chat client for direct provider calls or relayed calls through
/// an edge gateway.
pub struct LlmClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl LlmClient {
    pub fn new(config: ClientConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(ProviderError::Network)?;
        Ok(Self { http, config })
    }

    /// Stream one chat completion, invoking `on_token` for every text delta.
    ///
    /// Resolves with the full accumulated text, which equals the in-order
    /// concatenation of every delivered token. The callback is never invoked
    /// after cancellation has been observed.
    pub async fn stream_chat<F>(
        &self,
        request: StreamRequest,
        mut on_token: F,
    ) -> Result<StreamResult, ProviderError>
    where
        F: FnMut(&str),
    {
        if request.messages.is_empty() {
            return Err(ProviderError::Configuration(
                "messages must not be empty".to_string(),
            ));
        }

        let provider = self.config.resolve_provider(request.provider);
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.endpoints.default_model(provider));
        let cancel = request.cancel.clone().unwrap_or_default();

        // The deadline fires the shared cancellation path with the timed-out
        // marker; the guard kills the timer once the call settles.
        let _deadline = self.config.request_timeout.map(|timeout| {
            let cancel = cancel.clone();
            AbortOnDrop(tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                cancel.cancel_for_timeout();
            }))
        });

        let text = self
            .run_stream(provider, &model, &request.messages, &cancel, &mut on_token)
            .await?;

        Ok(StreamResult {
            provider,
            model,
            text,
        })
    }

    async fn run_stream(
        &self,
        provider: Provider,
        model: &str,
        messages: &[ChatMessage],
        cancel: &CancelToken,
        on_token: &mut dyn FnMut(&str),
    ) -> Result<String, ProviderError> {
        if cancel.is_cancelled() {
            return Err(cancelled(cancel));
        }

        let request = match &self.config.relay {
            Some(relay) => {
                tracing::debug!(%provider, model, url = %relay.url, "streaming via relay");
                let mut builder = self.http.post(&relay.url).json(&RelayBody {
                    provider,
                    model,
                    stream: true,
                    messages,
                });
                if let Some(key) = &relay.api_key {
                    builder = builder.bearer_auth(key.expose_secret());
                }
                builder
            }
            None => {
                let wire = wire::build(provider, &self.config.endpoints, model, messages)?;
                tracing::debug!(%provider, model, url = %wire.url, "streaming direct");
                self.http
                    .post(&wire.url)
                    .headers(wire.headers)
                    .json(&wire.body)
            }
        };

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(cancel)),
            sent = request.send() => sent.map_err(ProviderError::Network)?,
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = if detail.is_empty() {
                status.canonical_reason().unwrap_or("upstream error").to_string()
            } else {
                detail
            };
            return Err(ProviderError::UpstreamHttp {
                provider,
                status: status.as_u16(),
                detail,
            });
        }

        let mut parser = SseParser::new();
        let mut text = String::new();
        let mut body = Box::pin(response.bytes_stream());

        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(cancel)),
                chunk = body.next() => chunk,
            };
            let Some(chunk) = chunk else { break };
            let bytes = chunk.map_err(|e| ProviderError::Stream(e.to_string()))?;
            for event in parser.push(&bytes) {
                deliver(&event, &mut text, on_token)?;
            }
        }
        if let Some(event) = parser.finish() {
            deliver(&event, &mut text, on_token)?;
        }

        Ok(text)
    }
}

/// Handle one decoded frame: skip the finish sentinel and undecodable
/// payloads, abort on embedded errors, otherwise accumulate and forward the
/// token.
fn deliver(
    event: &SseEvent,
    text: &mut String,
    on_token: &mut dyn FnMut(&str),
) -> Result<(), ProviderError> {
    if event.data == "[DONE]" {
        return Ok(());
    }

    let payload: serde_json::Value = match serde_json::from_str(&event.data) {
        Ok(payload) => payload,
        Err(error) => {
            tracing::debug!(%error, "skipping undecodable SSE frame");
            return Ok(());
        }
    };

    if let Some(message) = extract::error_message(&payload) {
        return Err(ProviderError::UpstreamPayload(message));
    }

    if let Some(token) = extract::token(&payload, event.event.as_deref()) {
        if !token.is_empty() {
            text.push_str(&token);
            on_token(&token);
        }
    }
    Ok(())
}

fn cancelled(cancel: &CancelToken) -> ProviderError {
    ProviderError::Cancelled {
        timed_out: cancel.timed_out(),
    }
}

struct AbortOnDrop(tokio::task::JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}
