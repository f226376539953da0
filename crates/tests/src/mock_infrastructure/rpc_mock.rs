//! RPC Mock Builder for JSON-RPC Node Testing
//!
//! Wraps mockito so a test can stand up a node that answers over real HTTP.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

/// Builder for creating mock JSON-RPC node responses.
///
/// Every mock is registered with a hit expectation: at least once by default, or exactly the
/// count set through [`expect_hits`](Self::expect_hits).
pub struct RpcMockBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
    expected_hits: Option<usize>,
}

impl RpcMockBuilder {
    /// Creates a new RPC mock builder with a fresh mockito server.
    pub async fn new() -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new(), expected_hits: None }
    }

    /// Returns the URL of the mock server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Mocks registered after this call must be hit exactly `hits` times.
    pub fn expect_hits(&mut self, hits: usize) -> &mut Self {
        self.expected_hits = Some(hits);
        self
    }

    fn register(&mut self, mock: Mock) -> &mut Self {
        let mock = match self.expected_hits {
            Some(hits) => mock.expect(hits),
            None => mock.expect_at_least(1),
        };
        self.mocks.push(mock.create());
        self
    }

    /// Mocks an `eth_blockNumber` request.
    pub fn mock_block_number(&mut self, block_number: u64) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Regex(r#""method"\s*:\s*"eth_blockNumber""#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": format!("0x{block_number:x}")
                })
                .to_string(),
            );

        self.register(mock)
    }

    /// Mocks a generic JSON-RPC method with custom result.
    pub fn mock_method(&mut self, method: &str, result: &Value) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(Matcher::Regex(format!(r#""method"\s*:\s*"{method}""#)))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": result
                })
                .to_string(),
            );

        self.register(mock)
    }

    /// Mocks a JSON-RPC error answered with HTTP 200.
    pub fn mock_rpc_error(&mut self, method: &str, code: i32, message: &str) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(Matcher::Regex(format!(r#""method"\s*:\s*"{method}""#)))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": {
                        "code": code,
                        "message": message
                    }
                })
                .to_string(),
            );

        self.register(mock)
    }

    /// Mocks a raw response body for any request.
    pub fn mock_raw(&mut self, status: usize, body: &str) -> &mut Self {
        let mock = self.server.mock("POST", "/").with_status(status).with_body(body);

        self.register(mock)
    }

    /// Mocks a server error with the given status for any request.
    pub fn mock_server_error(&mut self, status: usize) -> &mut Self {
        self.mock_raw(status, "Internal Server Error")
    }

    /// Mocks a 2xx answer whose body is not JSON.
    pub fn mock_invalid_json(&mut self) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>502 Bad Gateway</body></html>");

        self.register(mock)
    }

    /// Returns a reference to the underlying mockito server for advanced mocking.
    pub fn get_server(&mut self) -> &mut ServerGuard {
        &mut self.server
    }

    /// Verifies every mock was hit as often as expected.
    #[must_use]
    pub fn verify_expectations(&self) -> bool {
        self.mocks.iter().all(Mock::matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rpc_mock_builder_creation() {
        let mock = RpcMockBuilder::new().await;
        assert!(mock.url().starts_with("http://127.0.0.1:"));
    }

    #[tokio::test]
    async fn test_unhit_mock_fails_verification() {
        let mut mock = RpcMockBuilder::new().await;
        mock.mock_block_number(16);
        assert!(!mock.verify_expectations());
    }

    #[tokio::test]
    async fn test_zero_hit_expectation_passes_untouched() {
        let mut mock = RpcMockBuilder::new().await;
        mock.expect_hits(0).mock_server_error(500);
        assert!(mock.verify_expectations());
    }
}
