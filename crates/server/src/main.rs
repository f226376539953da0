use anyhow::Result;
use axum::serve;
use citadel_core::{config::AppConfig, metrics::MetricsCollector, proxy::ProxyEngine};
use rustls::crypto::{ring::default_provider, CryptoProvider};
use server::{create_app, logging::init_logging, AppState};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<()> {
    CryptoProvider::install_default(default_provider())
        .map_err(|e| anyhow::anyhow!("Failed to install crypto provider: {e:?}"))?;

    let config =
        AppConfig::load().map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;

    init_logging(&config.logging);
    info!(environment = %config.environment, "Starting Citadel RPC proxy");
    debug!(
        endpoints = config.upstreams.endpoints.len(),
        fast_tier_size = config.race.fast_tier_size,
        request_timeout_ms = config.race.request_timeout_ms,
        "Configuration loaded"
    );

    let metrics = Arc::new(MetricsCollector::new());
    let engine = ProxyEngine::from_config(&config, Arc::clone(&metrics))
        .map_err(|e| anyhow::anyhow!("Proxy engine initialization failed: {e}"))?;
    for (position, endpoint) in engine.endpoints().full_tier().iter().enumerate() {
        debug!(
            position,
            upstream = %endpoint.name,
            fast_tier = position < engine.endpoints().fast_tier_size(),
            "Upstream registered"
        );
    }

    let state = AppState::new(Arc::new(engine), metrics, config.branding.as_str());
    let app = create_app(state, &config.server);

    let addr = config.socket_addr().map_err(anyhow::Error::msg)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, rpc_path = %config.server.rpc_path, "RPC proxy listening");

    if let Err(e) = serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error occurred");
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                () = std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight requests");
}
