use bytes::Bytes;
use citadel_core::{
    config::AppConfig,
    upstream::{with_deadline, Endpoint, HttpClient, HttpNodeFetcher, NodeFetcher, UpstreamError},
};
use futures::future::join_all;
use prettytable::{row, Table};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use super::{
    config::load_config,
    utils::{print_error, print_info, print_success, CliError, CliResult},
};

pub struct ProbeOptions {
    pub file: String,
    pub method: String,
    /// Overrides the configured attempt deadline.
    pub timeout_ms: Option<u64>,
}

/// Outcome of one probe against one endpoint.
pub struct ProbeResult {
    pub position: usize,
    pub endpoint: Endpoint,
    pub fast_tier: bool,
    pub latency: Duration,
    pub outcome: Result<Value, UpstreamError>,
}

impl ProbeResult {
    /// Short status for the table: the `result` field, the JSON-RPC error message, or the
    /// failure reason.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.outcome {
            Ok(body) => match (body.get("result"), body.get("error")) {
                (Some(result), _) => format!("OK {result}"),
                (None, Some(error)) => format!(
                    "RPC error {}",
                    error.get("message").and_then(Value::as_str).unwrap_or("(no message)")
                ),
                (None, None) => "OK (non-standard body)".to_string(),
            },
            Err(error) => format!("FAILED {error}"),
        }
    }
}

/// Sends `method` to every configured endpoint at once, each with its own deadline.
///
/// Results come back in configuration order.
pub async fn probe_endpoints(
    config: &AppConfig,
    fetcher: &dyn NodeFetcher,
    method: &str,
    deadline: Duration,
) -> CliResult<Vec<ProbeResult>> {
    let body = Bytes::from(serde_json::to_vec(
        &json!({"jsonrpc": "2.0", "method": method, "params": [], "id": 1}),
    )?);
    let endpoints = config.endpoint_set();

    let probes = endpoints.full_tier().iter().enumerate().map(|(position, endpoint)| {
        let body = body.clone();
        let fast_tier = position < endpoints.fast_tier_size();
        async move {
            let started = Instant::now();
            let outcome = with_deadline(deadline, fetcher.fetch(endpoint, body)).await;
            ProbeResult {
                position,
                endpoint: endpoint.clone(),
                fast_tier,
                latency: started.elapsed(),
                outcome,
            }
        }
    });

    Ok(join_all(probes).await)
}

pub async fn handle_probe_command(options: ProbeOptions) -> CliResult<()> {
    let config = load_config(&options.file)?;
    config.validate().map_err(CliError::Config)?;

    let deadline =
        options.timeout_ms.map_or_else(|| config.request_timeout(), Duration::from_millis);
    let fetcher = HttpNodeFetcher::new(HttpClient::with_config(config.http_client_config())?);

    print_info(&format!(
        "Probing {} endpoints with {} (deadline {}ms)...",
        config.upstreams.endpoints.len(),
        options.method,
        deadline.as_millis()
    ));

    let results = probe_endpoints(&config, &fetcher, &options.method, deadline).await?;

    let mut table = Table::new();
    table.add_row(row!["#", "Name", "Tier", "Latency", "Status", "URL"]);
    for result in &results {
        table.add_row(row![
            result.position + 1,
            result.endpoint.name,
            if result.fast_tier { "fast" } else { "full" },
            format!("{}ms", result.latency.as_millis()),
            result.summary(),
            result.endpoint.url
        ]);
    }
    table.printstd();

    let healthy = results.iter().filter(|r| r.outcome.is_ok()).count();
    let fast_healthy = results.iter().filter(|r| r.fast_tier && r.outcome.is_ok()).count();

    if healthy == 0 {
        print_error("No endpoint answered; every relayed request would fail");
    } else if fast_healthy == 0 {
        print_error(&format!(
            "Fast tier is down; requests will wait for the full tier ({healthy}/{} answering)",
            results.len()
        ));
    } else {
        print_success(&format!("{healthy}/{} endpoints answering", results.len()));
    }

    Ok(())
}
