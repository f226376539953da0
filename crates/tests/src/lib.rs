//! Integration Tests for the Citadel RPC Proxy
//!
//! This crate contains various test modules:
//!
//! - `race_scheduler_tests`: Timing properties of the two-tier race on a paused clock
//! - `failover_tests`: The real HTTP fetcher against mockito upstreams
//! - `router_tests`: The full axum app, from raw request bytes to the client reply
//! - `mock_infrastructure`: Reusable mock types for testing (scripted fetcher, RPC mocks)
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```
//!
//! No test touches the network beyond loopback: upstreams are either mockito servers bound to
//! `127.0.0.1` or a scripted in-process fetcher.



#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod router_tests;

/// Mock infrastructure for testing
pub mod mock_infrastructure;
