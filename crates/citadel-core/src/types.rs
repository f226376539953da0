//! JSON-RPC envelope types shared by the validator, the race scheduler and the
//! response synthesizer.
//!
//! Upstream payloads are never decoded into these types. A successful upstream body is
//! relayed as an opaque [`serde_json::Value`]; [`JsonRpcResponse`] only models the envelopes
//! the proxy synthesizes itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// JSON-RPC protocol version constant to avoid repeated allocations.
pub const JSONRPC_VERSION: &str = "2.0";

/// Pre-allocated `Cow` for the JSON-RPC version.
pub const JSONRPC_VERSION_COW: Cow<'static, str> = Cow::Borrowed(JSONRPC_VERSION);

/// Invalid JSON was received.
pub const PARSE_ERROR: i32 = -32700;

/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: i32 = -32600;

/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i32 = -32603;

/// High-frequency polling methods excluded from per-request logging.
pub const QUIET_METHODS: &[&str] = &["eth_blockNumber", "eth_getFilterChanges"];

/// Returns `true` for polling methods that should not produce an `info` line per call.
#[inline]
#[must_use]
pub fn is_quiet_method(method: &str) -> bool {
    QUIET_METHODS.contains(&method)
}

fn default_version() -> Cow<'static, str> {
    JSONRPC_VERSION_COW
}

/// Inbound JSON-RPC 2.0 request.
///
/// Only `method` is mandatory. A missing `id` deserializes to `null`, which is also what an
/// explicit `"id": null` yields; the proxy does not distinguish notifications from requests.
///
/// # Example
///
/// ```
/// use citadel_core::types::JsonRpcRequest;
/// use serde_json::json;
///
/// let request: JsonRpcRequest =
///     serde_json::from_value(json!({"jsonrpc": "2.0", "method": "eth_chainId", "id": 7}))
///         .unwrap();
///
/// assert_eq!(request.method, "eth_chainId");
/// assert_eq!(request.id, json!(7));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_version")]
    pub jsonrpc: Cow<'static, str>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default)]
    pub id: Value,
}

impl JsonRpcRequest {
    /// Creates a new request with the static version string.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Option<Value>, id: Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, method: method.into(), params, id }
    }

    /// Id to echo in a synthesized failure envelope: the request's own id, or `1` when the
    /// request carried none.
    #[must_use]
    pub fn id_or_default(&self) -> Value {
        if self.id.is_null() {
            Value::from(1)
        } else {
            self.id.clone()
        }
    }
}

/// A validated inbound payload: one request object or a JSON-RPC batch.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcPayload {
    Single(JsonRpcRequest),
    Batch(Vec<JsonRpcRequest>),
}

impl RpcPayload {
    /// Number of requests carried by the payload.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(items) => items.len(),
        }
    }

    /// Always `false` for validated payloads; empty batches are rejected during validation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Method name used in logs and metrics. Batches are labelled `batch`.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Single(request) => &request.method,
            Self::Batch(_) => "batch",
        }
    }

    /// `true` when every request in the payload is a quiet polling method.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        match self {
            Self::Single(request) => is_quiet_method(&request.method),
            Self::Batch(items) => items.iter().all(|r| is_quiet_method(&r.method)),
        }
    }

    /// Iterates over the requests in submission order.
    pub fn requests(&self) -> impl Iterator<Item = &JsonRpcRequest> {
        match self {
            Self::Single(request) => std::slice::from_ref(request).iter(),
            Self::Batch(items) => items.iter(),
        }
    }
}

/// JSON-RPC 2.0 error object.
///
/// `data` is omitted from the wire format when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC 2.0 response envelope synthesized by the proxy.
///
/// # Example
///
/// ```
/// use citadel_core::types::{JsonRpcResponse, INTERNAL_ERROR};
/// use serde_json::json;
///
/// let response = JsonRpcResponse::error(INTERNAL_ERROR, "boom", json!(1));
/// let wire = serde_json::to_value(&response).unwrap();
///
/// assert_eq!(wire, json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32603, "message": "boom"}}));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: Cow<'static, str>,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Creates an error envelope without `data`.
    #[must_use]
    pub fn error(code: i32, message: impl Into<String>, id: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION_COW,
            id,
            result: None,
            error: Some(JsonRpcError { code, message: message.into(), data: None }),
        }
    }

    /// Attaches diagnostic `data` to the error object. No-op on success envelopes.
    #[must_use]
    pub fn with_data(mut self, data: Option<Value>) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.data = data;
        }
        self
    }

    /// Serializes the envelope into a JSON value.
    ///
    /// The envelope only holds strings, integers and JSON values, so serialization cannot fail.
    #[must_use]
    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
