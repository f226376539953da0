//! Static, ordered upstream endpoint list.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One upstream JSON-RPC node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Label used in logs and metrics.
    pub name: Arc<str>,
    /// HTTP(S) URL the request body is POSTed to.
    pub url: String,
}

impl Endpoint {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, url: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into() }
    }

    /// Creates an endpoint named after the URL's host (and port, when present).
    ///
    /// Falls back to the full URL when it cannot be parsed.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let name = reqwest::Url::parse(&url)
            .ok()
            .and_then(|parsed| {
                let host = parsed.host_str()?.to_string();
                Some(match parsed.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host,
                })
            })
            .unwrap_or_else(|| url.clone());

        Self { name: Arc::from(name), url }
    }
}

/// Immutable priority list of upstream endpoints split into two tiers.
///
/// Order expresses preference. The fast tier is the first `fast_tier_size` endpoints; the full
/// tier is the whole list, fast tier included. Cloning is cheap (`Arc` slice).
#[derive(Debug, Clone)]
pub struct EndpointSet {
    endpoints: Arc<[Endpoint]>,
    fast_tier_size: usize,
}

impl EndpointSet {
    /// Creates a new endpoint set. A `fast_tier_size` larger than the list is clamped.
    #[must_use]
    pub fn new(endpoints: Vec<Endpoint>, fast_tier_size: usize) -> Self {
        let fast_tier_size = fast_tier_size.min(endpoints.len());
        Self { endpoints: endpoints.into(), fast_tier_size }
    }

    /// The preferred subset raced first.
    #[must_use]
    pub fn fast_tier(&self) -> &[Endpoint] {
        &self.endpoints[..self.fast_tier_size]
    }

    /// Every configured endpoint, raced after the fast tier is exhausted.
    #[must_use]
    pub fn full_tier(&self) -> &[Endpoint] {
        &self.endpoints
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    #[must_use]
    pub fn fast_tier_size(&self) -> usize {
        self.fast_tier_size
    }
}
