//! Tern Protocol - shared types for the streaming gateway
//!
//! This crate defines the provider-agnostic vocabulary used by both the
//! in-process streaming client and the relay server:
//! - Conversation messages and roles
//! - The upstream provider selector
//! - Stream results and the cooperative cancellation handle

mod cancel;
mod messages;
mod types;

pub use cancel::CancelToken;
pub use messages::{ChatMessage, Role};
pub use types::{ParseProviderError, Provider, StreamResult};
