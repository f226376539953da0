use thiserror::Error;

/// Why a single upstream attempt failed.
///
/// Every variant means "this node did not produce a usable answer in time". A JSON-RPC error
/// object returned with a 2xx status is not an `UpstreamError`: the node answered and its
/// payload is relayed as-is.
///
/// The `Display` output is what the proxy reports in the `data` field of its
/// "All nodes offline" envelope, so it must not carry URLs or response bodies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UpstreamError {
    /// The attempt did not complete before its deadline.
    #[error("timeout")]
    Timeout,

    /// The node answered with a non-2xx status. The body is not inspected.
    #[error("HTTP {0}")]
    HttpError(u16),

    /// The request never produced a response (DNS, TCP, TLS, or a broken body stream).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A 2xx response whose body is not valid JSON.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl UpstreamError {
    /// Returns a static label for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::HttpError(status) if (500..=599).contains(status) => "http_5xx",
            Self::HttpError(429) => "rate_limited",
            Self::HttpError(_) => "http_other",
            Self::ConnectionFailed(_) => "connection",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}
