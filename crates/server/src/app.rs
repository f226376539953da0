use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use citadel_core::config::ServerConfig;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{catch_panic::CatchPanicLayer, compression::CompressionLayer};

use crate::{
    middleware,
    router::{self, AppState},
};

/// Builds the public router.
///
/// Routes:
/// - `GET /`: liveness probe
/// - `POST /` and `POST {rpc_path}`: JSON-RPC relay
/// - `GET /metrics`: Prometheus exposition
///
/// The RPC routes share one concurrency budget and a request body limit. The limit is enforced
/// by the body extractor, so an oversized body is answered with a `413` JSON-RPC envelope. Every
/// route gets request ids, compression and panic recovery.
#[must_use]
pub fn create_app(state: AppState, config: &ServerConfig) -> Router {
    let (set_request_id, propagate_request_id) = middleware::create_request_id_layers();

    let mut rpc = Router::new().route("/", get(router::handle_liveness).post(router::handle_rpc));
    if config.rpc_path != "/" {
        rpc = rpc.route(&config.rpc_path, post(router::handle_rpc));
    }
    let rpc = rpc
        .layer(GlobalConcurrencyLimitLayer::new(config.max_concurrent_requests))
        .layer(DefaultBodyLimit::max(config.max_body_bytes));

    Router::new()
        .route("/metrics", get(router::handle_metrics))
        .merge(rpc)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(CatchPanicLayer::custom(router::panic_response))
        // Layers run outermost-last, so set runs before propagate.
        .layer(propagate_request_id)
        .layer(set_request_id)
}
