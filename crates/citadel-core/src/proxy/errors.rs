use std::any::Any;

use crate::upstream::UpstreamError;

/// Terminal outcome of handling one inbound request when no upstream payload is relayed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProxyError {
    /// The body is not valid JSON. No upstream is contacted.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Valid JSON that is not a JSON-RPC request object or batch. No upstream is contacted.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Both tiers were exhausted. `last_error` is the last attempt to fail, if any ran.
    #[error("All nodes offline")]
    AllNodesOffline { last_error: Option<UpstreamError> },

    /// The relay itself failed (a panic while racing). The message is sent to the client as
    /// `data`.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Extracts the message from a panic payload.
#[must_use]
pub fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "handler panicked".to_string()
    }
}

impl ProxyError {
    /// Returns a static label for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse_error",
            Self::InvalidRequest(_) => "invalid_request",
            Self::AllNodesOffline { .. } => "all_nodes_offline",
            Self::Internal(_) => "internal_error",
        }
    }

    /// `true` for errors caused by the client's input rather than the upstreams.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::InvalidRequest(_))
    }
}
