//! Response Synthesizer: turns the outcome of a relay into the HTTP status and JSON body sent
//! back to the client.
//!
//! Every path answers with a JSON-RPC envelope. Total upstream exhaustion is reported with
//! HTTP 200 so clients that only inspect the body still see the error; only malformed client
//! input uses HTTP 400.

use reqwest::StatusCode;
use serde_json::Value;

use crate::{
    proxy::errors::ProxyError,
    types::{JsonRpcResponse, RpcPayload, INTERNAL_ERROR, INVALID_REQUEST, PARSE_ERROR},
};

pub const PARSE_ERROR_MESSAGE: &str = "Parse error";
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid Request";
pub const ALL_NODES_OFFLINE_MESSAGE: &str = "Internal RPC Proxy Error: All nodes offline";
pub const INTERNAL_FAULT_MESSAGE: &str = "Internal server error";

/// HTTP status and body for one inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl RelayResponse {
    /// Builds the reply for a finished relay.
    ///
    /// `payload` is the validated request when validation succeeded; it supplies the ids echoed
    /// in failure envelopes.
    #[must_use]
    pub fn synthesize(outcome: Result<Value, ProxyError>, payload: Option<&RpcPayload>) -> Self {
        match outcome {
            Ok(body) => Self { status: StatusCode::OK, body },
            Err(error) => Self::from_error(&error, payload),
        }
    }

    /// Builds the reply for a failure.
    #[must_use]
    pub fn from_error(error: &ProxyError, payload: Option<&RpcPayload>) -> Self {
        match error {
            ProxyError::Parse(_) => Self {
                status: StatusCode::BAD_REQUEST,
                body: JsonRpcResponse::error(PARSE_ERROR, PARSE_ERROR_MESSAGE, Value::Null)
                    .into_value(),
            },
            ProxyError::InvalidRequest(reason) => Self {
                status: StatusCode::BAD_REQUEST,
                body: JsonRpcResponse::error(INVALID_REQUEST, INVALID_REQUEST_MESSAGE, Value::Null)
                    .with_data(Some(Value::String(reason.clone())))
                    .into_value(),
            },
            ProxyError::AllNodesOffline { last_error } => {
                let data = last_error.as_ref().map(|e| Value::String(e.to_string()));
                let envelope = |id: Value| {
                    JsonRpcResponse::error(INTERNAL_ERROR, ALL_NODES_OFFLINE_MESSAGE, id)
                        .with_data(data.clone())
                        .into_value()
                };

                let body = match payload {
                    Some(RpcPayload::Batch(items)) => Value::Array(
                        items.iter().map(|request| envelope(request.id_or_default())).collect(),
                    ),
                    Some(RpcPayload::Single(request)) => envelope(request.id_or_default()),
                    None => envelope(Value::from(1)),
                };

                Self { status: StatusCode::OK, body }
            }
            ProxyError::Internal(message) => {
                let id = match payload {
                    Some(RpcPayload::Single(request)) => request.id.clone(),
                    _ => Value::Null,
                };
                Self::internal_fault_with_id(message, id)
            }
        }
    }

    /// Generic `-32603` envelope for faults nothing else anticipated, with `id: null`.
    #[must_use]
    pub fn internal_fault(message: impl Into<String>) -> Self {
        Self::internal_fault_with_id(&message.into(), Value::Null)
    }

    fn internal_fault_with_id(message: &str, id: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: JsonRpcResponse::error(INTERNAL_ERROR, INTERNAL_FAULT_MESSAGE, id)
                .with_data(Some(Value::String(message.to_string())))
                .into_value(),
        }
    }
}
