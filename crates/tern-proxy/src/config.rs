//! Environment-driven gateway configuration
//!
//! Everything is resolved once at startup into an explicit struct; the
//! request path never touches the process environment, which keeps the
//! server testable without env mutation.
//!
//! **Environment variables:**
//! - `HOST` / `PORT`: bind address (default 0.0.0.0:8787)
//! - `DEFAULT_PROVIDER`: provider used when the request names none
//! - `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL`
//! - `ANTHROPIC_API_KEY`, `ANTHROPIC_MODEL`, `ANTHROPIC_BASE_URL`
//! - `ANTHROPIC_COMPAT_API_KEY`, `ANTHROPIC_COMPAT_BASE_URL`,
//!   `ANTHROPIC_COMPAT_MODEL`, `ANTHROPIC_COMPAT_AUTH_MODE`
//!   (`x-api-key`|`bearer`), `ANTHROPIC_COMPAT_VERSION`
//! - `ALLOWED_ORIGINS`: comma-separated origin allowlist (empty allows all)
//! - `REQUEST_TIMEOUT_SECS`: optional upstream request timeout

use std::env;
use tern_protocol::Provider;
use tern_providers::ProviderEndpoints;

use crate::cors;

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub default_provider: Option<Provider>,
    pub endpoints: ProviderEndpoints,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
            default_provider: None,
            endpoints: ProviderEndpoints::default(),
            allowed_origins: Vec::new(),
            request_timeout_secs: None,
        }
    }
}

impl ProxyConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8787),
            default_provider: env::var("DEFAULT_PROVIDER")
                .ok()
                .and_then(|v| v.parse().ok()),
            endpoints: ProviderEndpoints::from_env(),
            allowed_origins: cors::parse_allowed_origins(env::var("ALLOWED_ORIGINS").ok().as_deref()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|p| p.parse().ok()),
        }
    }

    /// Provider for one request: a recognized explicit value wins, then the
    /// configured default, then OpenAI. Unrecognized strings fall through
    /// rather than erroring.
    pub fn resolve_provider(&self, requested: Option<&str>) -> Provider {
        requested
            .and_then(|value| value.parse().ok())
            .or(self.default_provider)
            .unwrap_or(Provider::OpenAI)
    }
}
