//! # Citadel Core
//!
//! Core library for the Citadel JSON-RPC failover proxy.
//!
//! A single inbound request flows through four stages:
//!
//! - **[`proxy::validation`]**: parses the inbound envelope and rejects malformed bodies before
//!   any network I/O happens.
//! - **[`upstream`]**: the ordered endpoint list, the HTTP node fetcher, the scoped deadline
//!   primitive and the first-success race combinator.
//! - **[`proxy::engine`]**: the two-tier race scheduler (fast tier first, then every endpoint).
//! - **[`proxy::response`]**: turns the final outcome into a JSON-RPC envelope.
//!
//! ```text
//!  bytes ──► ValidatedRequest ──► ProxyEngine::relay ──► RelayResponse
//!                                   │
//!                     ┌─────────────┴─────────────┐
//!                     ▼                           ▼
//!              tier 1: fast tier           tier 2: full tier
//!          race_first_ok(fetch + deadline) per endpoint
//! ```
//!
//! The engine holds no mutable state across requests. Endpoints and timeouts are injected at
//! construction time from [`config::AppConfig`].

pub mod config;
pub mod metrics;
pub mod proxy;
pub mod types;
pub mod upstream;
