//! Tern Providers - the streaming chat core
//!
//! Shared by the in-process client and the relay server:
//! - Wire adapters for the three upstream protocols (OpenAI
//!   chat-completions, Anthropic Messages, Anthropic-compatible)
//! - Incremental SSE frame decoding
//! - Token extraction across payload shapes
//! - The request orchestrator ([`LlmClient`])

mod anthropic;
mod client;
mod compat;
mod config;
mod error;
pub mod extract;
mod openai;
pub mod sse;
pub mod wire;

pub use client::{LlmClient, StreamRequest};
pub use compat::messages_endpoint;
pub use config::{
    AuthMode, ClientConfig, CompatConfig, EndpointConfig, ProviderEndpoints, RelayTarget,
    DEFAULT_ANTHROPIC_MODEL, DEFAULT_OPENAI_MODEL,
};
pub use error::ProviderError;
pub use secrecy::SecretString;
pub use sse::{SseEvent, SseParser};
pub use wire::WireRequest;
