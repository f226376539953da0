//! Prometheus metrics for the relay path.
//!
//! All recording goes through the `metrics` facade and is lock-free. The exporter handle is
//! process-global: the first [`MetricsCollector`] installs the recorder and later ones share it.
//!
//! Method labels are restricted to a fixed set of common Ethereum methods; anything else is
//! reported as `other` so arbitrary client input cannot grow label cardinality.

use crate::upstream::UpstreamError;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::{sync::OnceLock, time::Duration};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Which stage of the two-tier race produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// A fast-tier endpoint answered.
    Fast,
    /// The fast tier was exhausted and a full-tier endpoint answered.
    Full,
    /// Every attempt in both tiers failed.
    Exhausted,
}

impl RelayOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Full => "full",
            Self::Exhausted => "exhausted",
        }
    }
}

#[inline]
fn method_label(method: &str) -> &'static str {
    match method {
        "batch" => "batch",
        "net_version" => "net_version",
        "eth_blockNumber" => "eth_blockNumber",
        "eth_chainId" => "eth_chainId",
        "eth_gasPrice" => "eth_gasPrice",
        "eth_getBalance" => "eth_getBalance",
        "eth_getBlockByHash" => "eth_getBlockByHash",
        "eth_getBlockByNumber" => "eth_getBlockByNumber",
        "eth_getLogs" => "eth_getLogs",
        "eth_getFilterChanges" => "eth_getFilterChanges",
        "eth_getTransactionByHash" => "eth_getTransactionByHash",
        "eth_getTransactionReceipt" => "eth_getTransactionReceipt",
        "eth_getTransactionCount" => "eth_getTransactionCount",
        "eth_getCode" => "eth_getCode",
        "eth_call" => "eth_call",
        "eth_estimateGas" => "eth_estimateGas",
        "eth_sendRawTransaction" => "eth_sendRawTransaction",
        _ => "other",
    }
}

fn init_prometheus_recorder() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "failed to install prometheus recorder, using detached fallback"
                );
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

/// Records relay outcomes, per-upstream failures and rejected requests.
pub struct MetricsCollector {
    prometheus_handle: PrometheusHandle,
}

impl MetricsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self { prometheus_handle: init_prometheus_recorder() }
    }

    /// Records one relayed inbound request and how long the whole race took.
    pub fn record_relay(&self, method: &str, outcome: RelayOutcome, duration: Duration) {
        let method = method_label(method);
        counter!("citadel_relays_total", "method" => method, "outcome" => outcome.as_str())
            .increment(1);
        histogram!("citadel_relay_duration_seconds", "outcome" => outcome.as_str())
            .record(duration.as_secs_f64());
    }

    /// Records a failed attempt against one upstream.
    pub fn record_upstream_failure(&self, upstream: &str, error: &UpstreamError) {
        counter!(
            "citadel_upstream_failures_total",
            "upstream" => upstream.to_string(),
            "kind" => error.kind()
        )
        .increment(1);
    }

    /// Records a request refused before any upstream was contacted.
    pub fn record_rejected(&self, reason: &'static str) {
        counter!("citadel_rejected_requests_total", "reason" => reason).increment(1);
    }

    /// Renders the Prometheus text exposition format.
    #[must_use]
    pub fn render(&self) -> String {
        self.prometheus_handle.render()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
