//! Actix Web relay surface
//!
//! Every path is served by one handler; behavior depends on the method only:
//! `OPTIONS` answers the CORS preflight, `GET` is a health check, `POST`
//! proxies the chat request upstream and streams the response body back
//! untouched.

use std::time::Duration;

use actix_web::http::{header, Method, StatusCode};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use tern_protocol::{ChatMessage, Provider};
use tern_providers::{messages_endpoint, wire, ProviderError};

use crate::config::ProxyConfig;
use crate::{cors, ProxyError};

#[derive(Clone)]
pub struct AppState {
    pub config: ProxyConfig,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("failed to build reqwest client")?;
        Ok(Self { config, client })
    }
}

pub async fn serve(config: ProxyConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    info!(addr = %addr, "llm-proxy listening");

    let state = web::Data::new(AppState::new(config)?);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes))
        .bind(&addr)
        .with_context(|| format!("failed to bind {addr}"))?
        .run()
        .await
        .context("server error")?;

    Ok(())
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.default_service(web::to(handle));
}

async fn handle(req: HttpRequest, state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let allowed = cors::resolve_origin(origin.as_deref(), &state.config.allowed_origins);

    let method = req.method();
    if method == Method::OPTIONS {
        return preflight(allowed);
    }
    if method == Method::GET {
        return json_response(
            StatusCode::OK,
            json!({ "ok": true, "service": "llm-proxy" }),
            allowed.as_deref(),
        );
    }
    if method != Method::POST {
        return error_response(&ProxyError::MethodNotAllowed, allowed.as_deref());
    }

    let Some(allowed) = allowed else {
        return error_response(&ProxyError::OriginNotAllowed, None);
    };

    match proxy_chat(&state, &body, &allowed).await {
        Ok(response) => response,
        Err(proxy_error) => {
            error!(error = %proxy_error, "proxy request failed");
            error_response(&proxy_error, Some(&allowed))
        }
    }
}

fn preflight(allowed: Option<String>) -> HttpResponse {
    match allowed {
        Some(origin) => {
            let mut builder = HttpResponse::NoContent();
            cors::apply(&mut builder, &origin);
            builder.finish()
        }
        None => error_response(&ProxyError::OriginNotAllowed, None),
    }
}

async fn proxy_chat(
    state: &AppState,
    body: &[u8],
    origin: &str,
) -> Result<HttpResponse, ProxyError> {
    let payload: Value = serde_json::from_slice(body).map_err(|_| ProxyError::InvalidJson)?;

    let entries = payload
        .get("messages")
        .and_then(Value::as_array)
        .filter(|entries| !entries.is_empty())
        .ok_or(ProxyError::InvalidMessages("messages is required."))?;
    if !entries
        .iter()
        .all(|entry| entry.get("content").is_some_and(Value::is_string))
    {
        return Err(ProxyError::InvalidMessages(
            "messages must contain valid content strings.",
        ));
    }
    let messages: Vec<ChatMessage> = serde_json::from_value(Value::Array(entries.clone()))
        .map_err(|_| ProxyError::InvalidMessages("messages must contain valid role values."))?;

    let provider =
        state
            .config
            .resolve_provider(payload.get("provider").and_then(Value::as_str));
    let model = payload
        .get("model")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| state.config.endpoints.default_model(provider));

    require_credentials(&state.config, provider)?;

    let wire = wire::build(provider, &state.config.endpoints, &model, &messages)
        .map_err(|e| match e {
            ProviderError::Configuration(message) => ProxyError::Internal(message),
            other => ProxyError::Internal(other.to_string()),
        })?;

    debug!(%provider, model = %model, "proxying chat request");

    let upstream = state
        .client
        .post(&wire.url)
        .headers(wire.headers)
        .json(&wire.body)
        .send()
        .await
        .map_err(|e| ProxyError::Internal(format!("{provider} request failed: {e}")))?;

    let status = upstream.status();
    if !status.is_success() {
        let detail = upstream.text().await.unwrap_or_default();
        let detail = if detail.is_empty() {
            status.canonical_reason().unwrap_or("").to_string()
        } else {
            detail
        };
        return Err(ProxyError::Upstream {
            provider,
            status: status.as_u16(),
            detail,
        });
    }

    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("text/event-stream; charset=utf-8")
        .to_string();

    let mut builder =
        HttpResponse::build(StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::OK));
    builder.content_type(content_type);
    builder.insert_header((header::CACHE_CONTROL, "no-cache"));
    cors::apply(&mut builder, origin);

    Ok(builder.streaming(upstream.bytes_stream().map(|chunk| {
        chunk.map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))
    })))
}

/// Reject before any upstream traffic when the selected provider's
/// server-held credentials are absent or unusable.
fn require_credentials(config: &ProxyConfig, provider: Provider) -> Result<(), ProxyError> {
    let endpoints = &config.endpoints;
    match provider {
        Provider::OpenAI => {
            if endpoints.openai.api_key.is_none() {
                return Err(ProxyError::MissingConfig("OPENAI_API_KEY"));
            }
        }
        Provider::Anthropic => {
            if endpoints.anthropic.api_key.is_none() {
                return Err(ProxyError::MissingConfig("ANTHROPIC_API_KEY"));
            }
        }
        Provider::AnthropicCompatible => {
            if endpoints.compat.api_key.is_none() {
                return Err(ProxyError::MissingConfig("ANTHROPIC_COMPAT_API_KEY"));
            }
            let Some(base) = endpoints.compat.base_url.as_deref() else {
                return Err(ProxyError::MissingConfig("ANTHROPIC_COMPAT_BASE_URL"));
            };
            let endpoint = messages_endpoint(base);
            if endpoint.is_empty() || url::Url::parse(&endpoint).is_err() {
                return Err(ProxyError::InvalidCompatBaseUrl);
            }
        }
    }
    Ok(())
}

fn json_response(status: StatusCode, body: Value, origin: Option<&str>) -> HttpResponse {
    let mut builder = HttpResponse::build(status);
    builder.content_type("application/json; charset=utf-8");
    if let Some(origin) = origin {
        cors::apply(&mut builder, origin);
    }
    builder.json(body)
}

fn error_response(proxy_error: &ProxyError, origin: Option<&str>) -> HttpResponse {
    let status =
        StatusCode::from_u16(proxy_error.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(status, proxy_error.payload(), origin)
}
