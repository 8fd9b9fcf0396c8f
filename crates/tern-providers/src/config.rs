//! Client-side configuration
//!
//! Credentials and endpoint settings are resolved once into explicit structs
//! (typically via [`ClientConfig::from_env`] at startup); nothing below this
//! layer reads the process environment.

use secrecy::SecretString;
use std::time::Duration;
use tern_protocol::Provider;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-latest";

pub(crate) const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub(crate) const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";

/// How the Anthropic-compatible adapter presents its credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// `Authorization: Bearer <key>`
    #[default]
    Bearer,
    /// `x-api-key: <key>`
    XApiKey,
}

impl AuthMode {
    /// Only the exact string `x-api-key` selects header mode; anything else
    /// falls back to bearer auth.
    pub fn parse(value: &str) -> Self {
        if value == "x-api-key" {
            Self::XApiKey
        } else {
            Self::Bearer
        }
    }
}

/// Credential and endpoint overrides for one provider.
#[derive(Debug, Clone, Default)]
pub struct EndpointConfig {
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

/// Settings for an Anthropic-compatible endpoint hosted at a custom base URL.
#[derive(Debug, Clone, Default)]
pub struct CompatConfig {
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub auth_mode: AuthMode,
    /// `anthropic-version` header, sent only when configured.
    pub version: Option<String>,
}

/// Per-provider credentials and endpoints, shared between the in-process
/// client and the relay server.
#[derive(Debug, Clone, Default)]
pub struct ProviderEndpoints {
    pub openai: EndpointConfig,
    pub anthropic: EndpointConfig,
    pub compat: CompatConfig,
}

impl ProviderEndpoints {
    pub fn from_env() -> Self {
        Self {
            openai: EndpointConfig {
                api_key: env_var("OPENAI_API_KEY").map(SecretString::from),
                base_url: env_var("OPENAI_BASE_URL"),
                model: env_var("OPENAI_MODEL"),
            },
            anthropic: EndpointConfig {
                api_key: env_var("ANTHROPIC_API_KEY").map(SecretString::from),
                base_url: env_var("ANTHROPIC_BASE_URL"),
                model: env_var("ANTHROPIC_MODEL"),
            },
            compat: CompatConfig {
                api_key: env_var("ANTHROPIC_COMPAT_API_KEY").map(SecretString::from),
                base_url: env_var("ANTHROPIC_COMPAT_BASE_URL"),
                model: env_var("ANTHROPIC_COMPAT_MODEL"),
                auth_mode: env_var("ANTHROPIC_COMPAT_AUTH_MODE")
                    .map(|v| AuthMode::parse(&v))
                    .unwrap_or_default(),
                version: env_var("ANTHROPIC_COMPAT_VERSION"),
            },
        }
    }

    /// Default model for a provider when the request does not name one. The
    /// compatible provider borrows the Anthropic model before falling back
    /// to the built-in default.
    pub fn default_model(&self, provider: Provider) -> String {
        match provider {
            Provider::OpenAI => self
                .openai
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            Provider::Anthropic => self
                .anthropic
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            Provider::AnthropicCompatible => self
                .compat
                .model
                .clone()
                .or_else(|| self.anthropic.model.clone())
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
        }
    }
}

/// A relay (edge gateway) the client streams through instead of calling the
/// provider directly. The relay performs its own adapter selection.
#[derive(Debug, Clone)]
pub struct RelayTarget {
    pub url: String,
    pub api_key: Option<SecretString>,
}

/// Configuration for [`crate::LlmClient`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub default_provider: Option<Provider>,
    pub endpoints: ProviderEndpoints,
    pub relay: Option<RelayTarget>,
    /// When set, a timer cancels the in-flight request with the timed-out
    /// marker after this duration.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self {
            default_provider: env_var("DEFAULT_PROVIDER").and_then(|v| v.parse().ok()),
            endpoints: ProviderEndpoints::from_env(),
            relay: env_var("LLM_PROXY_URL").map(|url| RelayTarget {
                url,
                api_key: env_var("LLM_PROXY_KEY").map(SecretString::from),
            }),
            request_timeout: env_var("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
        }
    }

    pub fn with_default_provider(mut self, provider: Provider) -> Self {
        self.default_provider = Some(provider);
        self
    }

    pub fn with_relay(mut self, url: impl Into<String>, api_key: Option<SecretString>) -> Self {
        self.relay = Some(RelayTarget {
            url: url.into(),
            api_key,
        });
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Resolution order: explicit request value, configured default, OpenAI.
    pub fn resolve_provider(&self, requested: Option<Provider>) -> Provider {
        requested.or(self.default_provider).unwrap_or(Provider::OpenAI)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_mode_parse() {
        assert_eq!(AuthMode::parse("x-api-key"), AuthMode::XApiKey);
        assert_eq!(AuthMode::parse("bearer"), AuthMode::Bearer);
        assert_eq!(AuthMode::parse("anything-else"), AuthMode::Bearer);
    }

    #[test]
    fn test_resolve_provider_chain() {
        let config = ClientConfig::default();
        assert_eq!(config.resolve_provider(None), Provider::OpenAI);

        let config = ClientConfig::default().with_default_provider(Provider::Anthropic);
        assert_eq!(config.resolve_provider(None), Provider::Anthropic);
        assert_eq!(
            config.resolve_provider(Some(Provider::AnthropicCompatible)),
            Provider::AnthropicCompatible
        );
    }

    #[test]
    fn test_default_model_fallbacks() {
        let endpoints = ProviderEndpoints::default();
        assert_eq!(
            endpoints.default_model(Provider::OpenAI),
            DEFAULT_OPENAI_MODEL
        );
        assert_eq!(
            endpoints.default_model(Provider::AnthropicCompatible),
            DEFAULT_ANTHROPIC_MODEL
        );

        let endpoints = ProviderEndpoints {
            anthropic: EndpointConfig {
                model: Some("claude-test".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        // The compatible provider borrows the Anthropic model when it has
        // none of its own.
        assert_eq!(
            endpoints.default_model(Provider::AnthropicCompatible),
            "claude-test"
        );

        let endpoints = ProviderEndpoints {
            compat: CompatConfig {
                model: Some("compat-model".to_string()),
                ..Default::default()
            },
            ..endpoints
        };
        assert_eq!(
            endpoints.default_model(Provider::AnthropicCompatible),
            "compat-model"
        );
    }
}
