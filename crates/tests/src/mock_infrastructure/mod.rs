//! Mock Infrastructure for Testing the Citadel RPC Proxy
//!
//! This module provides reusable mock types for testing upstream interactions
//! without requiring real network connections.
//!
//! ## Components
//!
//! - `RpcMockBuilder`: Wraps mockito to stand in for a JSON-RPC node over real HTTP
//! - `ScriptedFetcher`: In-process `NodeFetcher` with per-URL latency and outcome, for tests on
//!   a paused clock
//! - Test helpers for building engines and request bodies
//!
//! ## Usage
//!
//! ```ignore
//! use tests::mock_infrastructure::RpcMockBuilder;
//!
//! let mut node = RpcMockBuilder::new().await;
//! node.mock_block_number(0x10);
//!
//! // Use node.url() as an upstream endpoint
//! ```

pub mod rpc_mock;
pub mod test_helpers;

pub use rpc_mock::RpcMockBuilder;
pub use test_helpers::*;
