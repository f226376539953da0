//! Router Integration Tests
//!
//! Drives the complete axum app (layers included) with `oneshot` while the engine relays to
//! mockito nodes over real HTTP.

use crate::mock_infrastructure::{endpoint_set, RpcMockBuilder, DEFAULT_DEADLINE};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use citadel_core::{
    config::ServerConfig,
    metrics::MetricsCollector,
    proxy::ProxyEngine,
    upstream::{HttpClient, HttpNodeFetcher},
};
use serde_json::{json, Value};
use server::{create_app, AppState};
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_app(urls: &[String], fast_tier_size: usize) -> Router {
    create_test_app_with(urls, fast_tier_size, &ServerConfig::default())
}

fn create_test_app_with(urls: &[String], fast_tier_size: usize, config: &ServerConfig) -> Router {
    let metrics = Arc::new(MetricsCollector::new());
    let engine = ProxyEngine::new(
        endpoint_set(urls, fast_tier_size),
        Arc::new(HttpNodeFetcher::new(HttpClient::new().unwrap())),
        DEFAULT_DEADLINE,
        Arc::clone(&metrics),
    );
    create_app(
        AppState::new(Arc::new(engine), metrics, "Citadel Proxy Active"),
        config,
    )
}

fn rpc_request(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    serde_json::from_slice(&to_bytes(body, usize::MAX).await.unwrap()).unwrap()
}

#[tokio::test]
async fn test_relay_through_both_rpc_routes() {
    let mut node = RpcMockBuilder::new().await;
    node.expect_hits(2).mock_block_number(0x10);
    let app = create_test_app(&[node.url()], 3);

    for uri in ["/", "/api/rpc"] {
        let response = app
            .clone()
            .oneshot(rpc_request(
                uri,
                r#"{"jsonrpc":"2.0","method":"eth_blockNumber","params":[],"id":1}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "uri {uri}");
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(
            body_to_json(response.into_body()).await,
            json!({"jsonrpc": "2.0", "id": 1, "result": "0x10"})
        );
    }

    assert!(node.verify_expectations());
}

#[tokio::test]
async fn test_parse_error_short_circuits_before_upstreams() {
    let mut node = RpcMockBuilder::new().await;
    node.expect_hits(0).mock_block_number(1);
    let app = create_test_app(&[node.url()], 3);

    let response = app.oneshot(rpc_request("/api/rpc", "{\"method\": ")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({"jsonrpc": "2.0", "id": null, "error": {"code": -32700, "message": "Parse error"}})
    );
    assert!(node.verify_expectations());
}

#[tokio::test]
async fn test_invalid_request_shapes_are_rejected() {
    let mut node = RpcMockBuilder::new().await;
    node.expect_hits(0).mock_block_number(1);
    let app = create_test_app(&[node.url()], 3);

    for (body, reason) in [("[]", "empty batch"), ("42", "expected a request object or a batch")] {
        let response = app.clone().oneshot(rpc_request("/", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], json!(-32600));
        assert_eq!(body["error"]["data"], json!(reason));
        assert_eq!(body["id"], Value::Null);
    }

    assert!(node.verify_expectations());
}

#[tokio::test]
async fn test_exhaustion_is_http_200_envelope() {
    let mut nodes = Vec::new();
    for _ in 0..2 {
        let mut node = RpcMockBuilder::new().await;
        node.mock_server_error(502);
        nodes.push(node);
    }
    let urls: Vec<String> = nodes.iter().map(RpcMockBuilder::url).collect();
    let app = create_test_app(&urls, 1);

    let response = app
        .oneshot(rpc_request("/api/rpc", r#"{"jsonrpc":"2.0","method":"eth_chainId","id":"abc"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({
            "jsonrpc": "2.0",
            "id": "abc",
            "error": {
                "code": -32603,
                "message": "Internal RPC Proxy Error: All nodes offline",
                "data": "HTTP 502"
            }
        })
    );
}

#[tokio::test]
async fn test_liveness_never_contacts_upstreams() {
    let mut node = RpcMockBuilder::new().await;
    node.expect_hits(0).mock_block_number(1);
    let app = create_test_app(&[node.url()], 3);

    let request = Request::builder().uri("/").method("GET").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({"status": "ok", "branding": "Citadel Proxy Active"})
    );
    assert!(node.verify_expectations());
}

#[tokio::test]
async fn test_metrics_reflect_relays() {
    let mut node = RpcMockBuilder::new().await;
    node.mock_block_number(7);
    let app = create_test_app(&[node.url()], 3);

    let response = app
        .clone()
        .oneshot(rpc_request("/", r#"{"jsonrpc":"2.0","method":"eth_blockNumber","id":1}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder().uri("/metrics").method("GET").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec())
        .unwrap();
    assert!(text.contains("citadel_relays_total"), "metrics output: {text}");
}

#[tokio::test]
async fn test_oversized_body_gets_envelope_without_upstream_call() {
    let mut node = RpcMockBuilder::new().await;
    node.expect_hits(0).mock_block_number(1);
    let config = ServerConfig { max_body_bytes: 16, ..ServerConfig::default() };
    let app = create_test_app_with(&[node.url()], 3, &config);

    let body = r#"{"jsonrpc":"2.0","method":"eth_blockNumber","id":1}"#;
    let request = Request::builder()
        .uri("/api/rpc")
        .method("POST")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], json!(-32600));
    assert_eq!(body["id"], Value::Null);
    assert!(node.verify_expectations());
}
