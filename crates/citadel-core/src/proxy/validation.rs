//! Request Validator: the only gate between raw client bytes and the network.
//!
//! A body passes when it is a JSON object with a string `method`, or a non-empty array of such
//! objects. Everything else is rejected here, so malformed input never reaches an upstream.

use bytes::Bytes;
use serde_json::Value;

use crate::{
    proxy::errors::ProxyError,
    types::{JsonRpcRequest, RpcPayload},
};

/// An inbound body that passed validation.
///
/// The original bytes are kept and relayed to upstreams verbatim; the parsed payload is only
/// used for logging, metrics and composing failure envelopes.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    body: Bytes,
    payload: RpcPayload,
}

impl ValidatedRequest {
    /// Parses and checks an inbound body.
    ///
    /// # Errors
    ///
    /// - [`ProxyError::Parse`] if the body is not valid JSON
    /// - [`ProxyError::InvalidRequest`] if it is JSON but not a request object or a non-empty
    ///   batch of request objects
    pub fn parse(body: Bytes) -> Result<Self, ProxyError> {
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| ProxyError::Parse(e.to_string()))?;

        let payload = match value {
            Value::Object(_) => RpcPayload::Single(parse_request(value)?),
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(ProxyError::InvalidRequest("empty batch".to_string()));
                }
                let requests = items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| {
                        parse_request(item).map_err(|e| match e {
                            ProxyError::InvalidRequest(reason) => {
                                ProxyError::InvalidRequest(format!("batch item {index}: {reason}"))
                            }
                            other => other,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                RpcPayload::Batch(requests)
            }
            _ => {
                return Err(ProxyError::InvalidRequest(
                    "expected a request object or a batch".to_string(),
                ))
            }
        };

        Ok(Self { body, payload })
    }

    /// The exact bytes received from the client.
    #[must_use]
    pub fn body(&self) -> Bytes {
        self.body.clone()
    }

    #[must_use]
    pub fn payload(&self) -> &RpcPayload {
        &self.payload
    }

    /// Method name for logs and metrics (`batch` for batches).
    #[must_use]
    pub fn label(&self) -> &str {
        self.payload.label()
    }
}

fn parse_request(value: Value) -> Result<JsonRpcRequest, ProxyError> {
    if !value.is_object() {
        return Err(ProxyError::InvalidRequest("request must be an object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| ProxyError::InvalidRequest(e.to_string()))
}
