//! Tern Proxy - edge gateway for streamed chat requests
//!
//! Accepts a provider-agnostic JSON body, selects the matching wire adapter
//! using server-held credentials (never exposed to the browser), and
//! re-streams the raw upstream SSE body back to the caller. The gateway is a
//! transparent relay: it does not re-parse the stream it forwards.

pub mod config;
pub mod cors;
pub mod error;
pub mod server;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use server::{routes, serve, AppState};
