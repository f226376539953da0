use std::{panic::AssertUnwindSafe, sync::Arc, time::Duration};

use bytes::Bytes;
use futures::FutureExt;
use serde_json::Value;
use tokio::time::Instant;

use crate::{
    config::AppConfig,
    metrics::{MetricsCollector, RelayOutcome},
    proxy::{
        errors::{panic_message, ProxyError},
        response::RelayResponse,
        validation::ValidatedRequest,
    },
    upstream::{
        race_first_ok, with_deadline, Endpoint, EndpointSet, HttpClient, HttpNodeFetcher,
        NodeFetcher, RaceFailure, UpstreamError,
    },
};

/// Which endpoint subset a race runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Fast,
    Full,
}

impl Tier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Full => "full",
        }
    }
}

/// Two-tier race scheduler.
///
/// Every request first races the fast tier; if no attempt there succeeds, the full endpoint list
/// is raced with fresh attempts. Each attempt carries its own deadline, so a tier never takes
/// longer than `request_timeout` regardless of how many endpoints it contains.
///
/// The engine holds only immutable configuration and is shared across requests behind an `Arc`.
pub struct ProxyEngine {
    endpoints: EndpointSet,
    fetcher: Arc<dyn NodeFetcher>,
    request_timeout: Duration,
    metrics: Arc<MetricsCollector>,
}

impl ProxyEngine {
    #[must_use]
    pub fn new(
        endpoints: EndpointSet,
        fetcher: Arc<dyn NodeFetcher>,
        request_timeout: Duration,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self { endpoints, fetcher, request_timeout, metrics }
    }

    /// Builds an engine that talks to the configured upstreams over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(
        config: &AppConfig,
        metrics: Arc<MetricsCollector>,
    ) -> Result<Self, UpstreamError> {
        let client = HttpClient::with_config(config.http_client_config())?;
        Ok(Self::new(
            config.endpoint_set(),
            Arc::new(HttpNodeFetcher::new(client)),
            config.request_timeout(),
            metrics,
        ))
    }

    #[must_use]
    pub fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Validates a raw body, relays it and synthesizes the client reply.
    ///
    /// Bodies that fail validation are answered without contacting any upstream. A panic while
    /// relaying becomes a `-32603` envelope that still echoes the request id.
    pub async fn handle(&self, body: Bytes) -> RelayResponse {
        let request = match ValidatedRequest::parse(body) {
            Ok(request) => request,
            Err(error) => {
                tracing::debug!(error = %error, "rejected inbound request");
                self.metrics.record_rejected(error.kind());
                return RelayResponse::from_error(&error, None);
            }
        };

        let outcome =
            AssertUnwindSafe(self.relay(&request)).catch_unwind().await.unwrap_or_else(|panic| {
                let message = panic_message(panic.as_ref());
                tracing::error!(method = %request.label(), panic = %message, "relay panicked");
                Err(ProxyError::Internal(message))
            });
        RelayResponse::synthesize(outcome, Some(request.payload()))
    }

    /// Relays a validated request and returns the first upstream payload that arrived.
    ///
    /// The payload is returned untouched, including JSON-RPC error envelopes produced by a
    /// responsive node.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::AllNodesOffline`] carrying the last failure of the full tier when
    /// both tiers are exhausted.
    pub async fn relay(&self, request: &ValidatedRequest) -> Result<Value, ProxyError> {
        let started = Instant::now();
        let method = request.label();
        let quiet = request.payload().is_quiet();

        if !quiet {
            tracing::info!(method = %method, items = request.payload().len(), "relaying request");
        }

        match self.race_tier(Tier::Fast, self.endpoints.fast_tier(), request).await {
            Ok(payload) => {
                self.metrics.record_relay(method, RelayOutcome::Fast, started.elapsed());
                return Ok(payload);
            }
            Err(failure) => {
                tracing::warn!(
                    method = %method,
                    attempts = failure.attempts(),
                    last_error = ?failure.last().map(ToString::to_string),
                    "fast tier exhausted, escalating to full tier"
                );
            }
        }

        match self.race_tier(Tier::Full, self.endpoints.full_tier(), request).await {
            Ok(payload) => {
                self.metrics.record_relay(method, RelayOutcome::Full, started.elapsed());
                Ok(payload)
            }
            Err(mut failure) => {
                tracing::error!(
                    method = %method,
                    attempts = failure.attempts(),
                    elapsed_ms = started.elapsed().as_millis(),
                    last_error = ?failure.last().map(ToString::to_string),
                    "all upstream nodes failed"
                );
                self.metrics.record_relay(method, RelayOutcome::Exhausted, started.elapsed());
                Err(ProxyError::AllNodesOffline { last_error: failure.errors.pop() })
            }
        }
    }

    async fn race_tier(
        &self,
        tier: Tier,
        endpoints: &[Endpoint],
        request: &ValidatedRequest,
    ) -> Result<Value, RaceFailure<UpstreamError>> {
        let attempts = endpoints.iter().map(|endpoint| self.attempt(tier, endpoint, request));
        race_first_ok(attempts).await
    }

    async fn attempt(
        &self,
        tier: Tier,
        endpoint: &Endpoint,
        request: &ValidatedRequest,
    ) -> Result<Value, UpstreamError> {
        let started = Instant::now();
        let outcome =
            with_deadline(self.request_timeout, self.fetcher.fetch(endpoint, request.body()))
                .await;

        match &outcome {
            Ok(_) => {
                tracing::debug!(
                    upstream = %endpoint.name,
                    tier = tier.as_str(),
                    latency_ms = started.elapsed().as_millis(),
                    "upstream answered"
                );
            }
            Err(error) => {
                tracing::debug!(
                    upstream = %endpoint.name,
                    tier = tier.as_str(),
                    error = %error,
                    "upstream attempt failed"
                );
                self.metrics.record_upstream_failure(&endpoint.name, error);
            }
        }

        outcome
    }
}
