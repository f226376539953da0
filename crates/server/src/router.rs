use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use citadel_core::{
    metrics::MetricsCollector,
    proxy::{panic_message, ProxyEngine, ProxyError, RelayResponse},
};
use serde_json::json;
use std::{any::Any, sync::Arc};

/// Shared handler state. Everything behind it is immutable.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ProxyEngine>,
    pub metrics: Arc<MetricsCollector>,
    pub branding: Arc<str>,
}

impl AppState {
    #[must_use]
    pub fn new(
        engine: Arc<ProxyEngine>,
        metrics: Arc<MetricsCollector>,
        branding: impl Into<Arc<str>>,
    ) -> Self {
        Self { engine, metrics, branding: branding.into() }
    }
}

/// Renders a synthesized reply as an axum response.
#[must_use]
pub fn relay_response(reply: RelayResponse) -> Response {
    (reply.status, Json(reply.body)).into_response()
}

/// Handles a JSON-RPC request or batch.
///
/// The body is taken as raw bytes so that malformed JSON still gets a JSON-RPC envelope
/// instead of axum's plain-text rejection.
pub async fn handle_rpc(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(status = %rejection.status(), "failed to read request body");
            state.metrics.record_rejected("unreadable_body");
            let mut reply = RelayResponse::from_error(
                &ProxyError::InvalidRequest(rejection.body_text()),
                None,
            );
            reply.status = rejection.status();
            return relay_response(reply);
        }
    };

    relay_response(state.engine.handle(body).await)
}

/// Liveness probe. Never touches an upstream.
#[allow(clippy::unused_async)]
pub async fn handle_liveness(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok", "branding": state.branding.as_ref() })))
}

#[allow(clippy::unused_async)]
pub async fn handle_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.render(),
    )
}

/// Converts a handler panic into a `-32603` envelope for `CatchPanicLayer`.
#[allow(clippy::needless_pass_by_value)]
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic_message(panic.as_ref());

    tracing::error!(panic = %message, "request handler panicked");
    relay_response(RelayResponse::internal_fault(message))
}
