//! Node Fetcher: one upstream call, one outcome.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::upstream::{endpoint::Endpoint, http_client::HttpClient, UpstreamError};

/// Issues a single JSON-RPC call to one upstream endpoint.
///
/// Implementations must not retry and must not apply their own deadline; the race scheduler
/// wraps every call in [`with_deadline`](crate::upstream::with_deadline) and cancels it by
/// dropping the future.
///
/// `Ok` means the node answered with parseable JSON. A JSON-RPC `error` object inside that JSON
/// is still `Ok`: the node is alive and the client library interprets the error itself.
#[async_trait]
pub trait NodeFetcher: Send + Sync {
    /// Sends `body` verbatim to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] for transport failures, non-2xx statuses and bodies that are
    /// not valid JSON.
    async fn fetch(&self, endpoint: &Endpoint, body: Bytes) -> Result<Value, UpstreamError>;
}

/// [`NodeFetcher`] over HTTP POST.
pub struct HttpNodeFetcher {
    client: HttpClient,
}

impl HttpNodeFetcher {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NodeFetcher for HttpNodeFetcher {
    async fn fetch(&self, endpoint: &Endpoint, body: Bytes) -> Result<Value, UpstreamError> {
        let response = self.client.send_request(&endpoint.url, body).await?;

        serde_json::from_slice(&response).map_err(|e| {
            tracing::debug!(upstream = %endpoint.name, error = %e, "upstream returned invalid JSON");
            UpstreamError::InvalidResponse(e.to_string())
        })
    }
}
