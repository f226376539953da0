use bytes::Bytes;
use reqwest::{Client, ClientBuilder};
use std::{sync::Arc, time::Duration};
use tokio::sync::Semaphore;

use crate::upstream::UpstreamError;

/// Configuration for the upstream HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum number of upstream requests in flight across all inbound requests.
    pub concurrent_limit: usize,
    /// TCP/TLS connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Value of the `User-Agent` header sent upstream.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            concurrent_limit: 1000,
            connect_timeout_ms: 5000,
            user_agent: concat!("citadel-proxy/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP client with semaphore-based concurrency control.
///
/// Performs exactly one POST per call. Retries and deadlines belong to the caller: dropping the
/// returned future aborts the in-flight request and releases its permit.
pub struct HttpClient {
    client: Client,
    concurrent_limit: Arc<Semaphore>,
}

impl HttpClient {
    /// Creates a new HTTP client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn new() -> Result<Self, UpstreamError> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Creates a new HTTP client with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn with_config(config: HttpClientConfig) -> Result<Self, UpstreamError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(100)
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.as_str())
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                UpstreamError::ConnectionFailed(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self { client, concurrent_limit: Arc::new(Semaphore::new(config.concurrent_limit)) })
    }

    /// Sanitizes network errors so upstream URLs never reach clients.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_body() || error.is_decode() {
            "response body error".to_string()
        } else if error.is_redirect() {
            "unexpected redirect".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else {
            "network error".to_string()
        }
    }

    /// POSTs `body` as `application/json` and returns the raw response body.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::HttpError`] for non-2xx status codes (the body is not read)
    /// - [`UpstreamError::ConnectionFailed`] for transport failures or a closed semaphore
    pub async fn send_request(&self, url: &str, body: Bytes) -> Result<Bytes, UpstreamError> {
        let _permit = Arc::clone(&self.concurrent_limit).acquire_owned().await.map_err(|_| {
            tracing::warn!(url = url, "http client semaphore closed");
            UpstreamError::ConnectionFailed("client is shutting down".to_string())
        })?;

        tracing::trace!(
            available_permits = self.concurrent_limit.available_permits(),
            "http request started"
        );

        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| UpstreamError::ConnectionFailed(Self::sanitize_network_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::trace!(status = status.as_u16(), "http request failed");
            return Err(UpstreamError::HttpError(status.as_u16()));
        }

        response
            .bytes()
            .await
            .map_err(|e| UpstreamError::ConnectionFailed(Self::sanitize_network_error(&e)))
    }

    #[cfg(test)]
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.concurrent_limit.available_permits()
    }
}
