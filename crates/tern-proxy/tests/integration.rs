//! Service-level tests for the relay gateway.
//!
//! The actix service is driven in-process; upstream providers are played by
//! a wiremock server so the full method/CORS/validation/relay contract is
//! exercised without network access.

use actix_web::http::header;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header as upstream_header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tern_providers::{CompatConfig, EndpointConfig, ProviderEndpoints, SecretString};
use tern_proxy::{routes, AppState, ProxyConfig};

const SSE_BODY: &str = concat!(
    "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
    "data: [DONE]\n\n",
);

fn openai_config(base_url: String) -> ProxyConfig {
    ProxyConfig {
        endpoints: ProviderEndpoints {
            openai: EndpointConfig {
                api_key: Some(SecretString::from("sk-test")),
                base_url: Some(base_url),
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

fn anthropic_config(base_url: String) -> ProxyConfig {
    ProxyConfig {
        endpoints: ProviderEndpoints {
            anthropic: EndpointConfig {
                api_key: Some(SecretString::from("ak-test")),
                base_url: Some(base_url),
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

macro_rules! init_app {
    ($config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new($config).unwrap()))
                .configure(routes),
        )
        .await
    };
}

#[actix_web::test]
async fn preflight_reflects_origin_when_allowlist_empty() {
    let app = init_app!(ProxyConfig::default());

    let req = test::TestRequest::with_uri("/")
        .method(actix_web::http::Method::OPTIONS)
        .insert_header((header::ORIGIN, "https://foo.test"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 204);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "https://foo.test"
    );
    assert_eq!(
        resp.headers().get("access-control-allow-methods").unwrap(),
        "POST,OPTIONS,GET"
    );
}

#[actix_web::test]
async fn preflight_rejects_origin_outside_allowlist() {
    let config = ProxyConfig {
        allowed_origins: vec!["https://a.test".to_string()],
        ..Default::default()
    };
    let app = init_app!(config);

    let req = test::TestRequest::with_uri("/")
        .method(actix_web::http::Method::OPTIONS)
        .insert_header((header::ORIGIN, "https://b.test"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 403);
    assert!(resp.headers().get("access-control-allow-origin").is_none());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Origin not allowed.");
}

#[actix_web::test]
async fn health_check_reports_service_name() {
    let app = init_app!(ProxyConfig::default());

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header((header::ORIGIN, "https://foo.test"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "https://foo.test"
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "ok": true, "service": "llm-proxy" }));
}

#[actix_web::test]
async fn unsupported_method_is_405() {
    let app = init_app!(ProxyConfig::default());

    let req = test::TestRequest::put().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 405);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Method not allowed.");
}

#[actix_web::test]
async fn post_from_disallowed_origin_is_403() {
    let config = ProxyConfig {
        allowed_origins: vec!["https://a.test".to_string()],
        ..Default::default()
    };
    let app = init_app!(config);

    let req = test::TestRequest::post()
        .uri("/")
        .insert_header((header::ORIGIN, "https://b.test"))
        .set_payload(json!({ "messages": [{"role": "user", "content": "hi"}] }).to_string())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 403);
}

#[actix_web::test]
async fn invalid_json_body_is_400() {
    let app = init_app!(ProxyConfig::default());

    let req = test::TestRequest::post()
        .uri("/")
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid JSON payload.");
}

#[actix_web::test]
async fn empty_messages_is_400() {
    let app = init_app!(ProxyConfig::default());

    let req = test::TestRequest::post()
        .uri("/")
        .set_payload(json!({ "messages": [] }).to_string())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "messages is required.");
}

#[actix_web::test]
async fn non_string_content_is_400() {
    let app = init_app!(ProxyConfig::default());

    let req = test::TestRequest::post()
        .uri("/")
        .set_payload(json!({ "messages": [{"role": "user", "content": 42}] }).to_string())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "messages must contain valid content strings.");
}

#[actix_web::test]
async fn unknown_role_is_400() {
    let app = init_app!(ProxyConfig::default());

    let req = test::TestRequest::post()
        .uri("/")
        .set_payload(json!({ "messages": [{"role": "tool", "content": "x"}] }).to_string())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "messages must contain valid role values.");
}

#[actix_web::test]
async fn missing_openai_key_is_500_naming_variable() {
    let app = init_app!(ProxyConfig::default());

    let req = test::TestRequest::post()
        .uri("/")
        .set_payload(json!({ "messages": [{"role": "user", "content": "hi"}] }).to_string())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "Missing OPENAI_API_KEY in gateway environment."
    );
}

#[actix_web::test]
async fn missing_compat_base_url_is_500_naming_variable() {
    let config = ProxyConfig {
        endpoints: ProviderEndpoints {
            compat: CompatConfig {
                api_key: Some(SecretString::from("ck-test")),
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    };
    let app = init_app!(config);

    let req = test::TestRequest::post()
        .uri("/")
        .set_payload(
            json!({
                "provider": "anthropic-compatible",
                "messages": [{"role": "user", "content": "hi"}]
            })
            .to_string(),
        )
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "Missing ANTHROPIC_COMPAT_BASE_URL in gateway environment."
    );
}

#[actix_web::test]
async fn successful_relay_streams_upstream_body_verbatim() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(upstream_header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "stream": true, "model": "gpt-4o-mini" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(SSE_BODY, "text/event-stream; charset=utf-8"),
        )
        .mount(&upstream)
        .await;

    let app = init_app!(openai_config(upstream.uri()));

    let req = test::TestRequest::post()
        .uri("/")
        .insert_header((header::ORIGIN, "https://foo.test"))
        .set_payload(
            json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "hi"}]
            })
            .to_string(),
        )
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream; charset=utf-8"
    );
    assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-cache");
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "https://foo.test"
    );

    let body = test::read_body(resp).await;
    assert_eq!(body, SSE_BODY.as_bytes());
}

#[actix_web::test]
async fn anthropic_relay_merges_system_messages_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(upstream_header("x-api-key", "ak-test"))
        .and(upstream_header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({ "system": "a\n\nb" })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
            "text/event-stream",
        ))
        .mount(&upstream)
        .await;

    let app = init_app!(anthropic_config(upstream.uri()));

    let req = test::TestRequest::post()
        .uri("/")
        .set_payload(
            json!({
                "provider": "anthropic",
                "messages": [
                    {"role": "system", "content": "a"},
                    {"role": "user", "content": "q"},
                    {"role": "system", "content": "b"}
                ]
            })
            .to_string(),
        )
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let requests = upstream.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["system"], "a\n\nb");
    let sent_messages = sent["messages"].as_array().unwrap();
    assert_eq!(sent_messages.len(), 1);
    assert_eq!(sent_messages[0]["role"], "user");
}

#[actix_web::test]
async fn upstream_error_is_wrapped_with_provider_and_detail() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&upstream)
        .await;

    let app = init_app!(openai_config(upstream.uri()));

    let req = test::TestRequest::post()
        .uri("/")
        .set_payload(json!({ "messages": [{"role": "user", "content": "hi"}] }).to_string())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "openai upstream error");
    assert_eq!(body["detail"], "bad key");
}

#[actix_web::test]
async fn default_provider_config_routes_without_explicit_provider() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
            "text/event-stream",
        ))
        .mount(&upstream)
        .await;

    let config = ProxyConfig {
        default_provider: Some(tern_protocol::Provider::Anthropic),
        ..anthropic_config(upstream.uri())
    };
    let app = init_app!(config);

    let req = test::TestRequest::post()
        .uri("/")
        .set_payload(json!({ "messages": [{"role": "user", "content": "hi"}] }).to_string())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(upstream.received_requests().await.unwrap().len(), 1);
}
