//! Test Helper Functions and Utilities
//!
//! Scripted upstreams and engine builders shared by the integration tests.

use async_trait::async_trait;
use bytes::Bytes;
use citadel_core::{
    metrics::MetricsCollector,
    proxy::ProxyEngine,
    upstream::{Endpoint, EndpointSet, NodeFetcher, UpstreamError},
};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

/// Default per-attempt deadline.
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(8000);

struct Script {
    delay: Duration,
    outcome: Result<Value, UpstreamError>,
}

/// In-process [`NodeFetcher`] that answers each URL after a fixed delay.
///
/// Delays use `tokio::time::sleep`, so tests on a paused clock run instantly while the engine
/// still observes the scripted latencies. URLs without a script fail with
/// `ConnectionFailed`.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: HashMap<String, Script>,
    calls: HashMap<String, AtomicUsize>,
}

impl ScriptedFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `url` to produce `outcome` after `delay_ms`.
    #[must_use]
    pub fn script(
        mut self,
        url: &str,
        delay_ms: u64,
        outcome: Result<Value, UpstreamError>,
    ) -> Self {
        self.scripts
            .insert(url.to_string(), Script { delay: Duration::from_millis(delay_ms), outcome });
        self.calls.insert(url.to_string(), AtomicUsize::new(0));
        self
    }

    /// Scripts `url` to answer with `payload` after `delay_ms`.
    #[must_use]
    pub fn answer(self, url: &str, delay_ms: u64, payload: Value) -> Self {
        self.script(url, delay_ms, Ok(payload))
    }

    /// Scripts `url` to fail with `error` after `delay_ms`.
    #[must_use]
    pub fn fail(self, url: &str, delay_ms: u64, error: UpstreamError) -> Self {
        self.script(url, delay_ms, Err(error))
    }

    /// Number of fetches started against `url`, including ones later cancelled.
    #[must_use]
    pub fn calls(&self, url: &str) -> usize {
        self.calls.get(url).map_or(0, |count| count.load(Ordering::SeqCst))
    }

    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.values().map(|count| count.load(Ordering::SeqCst)).sum()
    }
}

#[async_trait]
impl NodeFetcher for ScriptedFetcher {
    async fn fetch(&self, endpoint: &Endpoint, _body: Bytes) -> Result<Value, UpstreamError> {
        let Some(script) = self.scripts.get(&endpoint.url) else {
            return Err(UpstreamError::ConnectionFailed("unscripted endpoint".to_string()));
        };
        if let Some(count) = self.calls.get(&endpoint.url) {
            count.fetch_add(1, Ordering::SeqCst);
        }

        tokio::time::sleep(script.delay).await;
        script.outcome.clone()
    }
}

/// `count` distinct upstream URLs, in priority order.
#[must_use]
pub fn node_urls(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("http://node-{n}.test")).collect()
}

/// Builds an endpoint set from URLs in priority order.
#[must_use]
pub fn endpoint_set<S: AsRef<str>>(urls: &[S], fast_tier_size: usize) -> EndpointSet {
    EndpointSet::new(
        urls.iter().map(|url| Endpoint::from_url(url.as_ref())).collect(),
        fast_tier_size,
    )
}

/// Builds an engine over `fetcher` with a fresh metrics collector.
#[must_use]
pub fn build_engine(
    endpoints: EndpointSet,
    fetcher: Arc<dyn NodeFetcher>,
    deadline: Duration,
) -> ProxyEngine {
    ProxyEngine::new(endpoints, fetcher, deadline, Arc::new(MetricsCollector::new()))
}

/// Serializes a single JSON-RPC request the way a wallet library would.
#[must_use]
pub fn rpc_body(method: &str, params: &Value, id: &Value) -> Bytes {
    Bytes::from(json!({"jsonrpc": "2.0", "method": method, "params": params, "id": id}).to_string())
}

/// `{"jsonrpc":"2.0","id":1,"result":<result>}`.
#[must_use]
pub fn result_payload(result: &str) -> Value {
    json!({"jsonrpc": "2.0", "id": 1, "result": result})
}

/// The envelope every client sees when both tiers are exhausted.
#[must_use]
pub fn all_nodes_offline(id: &Value, data: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": -32603,
            "message": "Internal RPC Proxy Error: All nodes offline",
            "data": data
        }
    })
}
