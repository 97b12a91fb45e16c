//! Transport error types

use thiserror::Error;

/// Failures talking to an out-of-process tool server
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote closed the connection")]
    Closed,

    #[error("Request '{method}' timed out after {timeout_ms}ms")]
    Timeout { method: String, timeout_ms: u64 },

    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Remote error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Remote transport not connected")]
    NotConnected,
}

impl TransportError {
    /// True when the connection can no longer be used
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TransportError::Io(_)
                | TransportError::Closed
                | TransportError::NotConnected
                | TransportError::Timeout { .. }
                | TransportError::Malformed(_)
        )
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Malformed(err.to_string())
    }
}
