//! Tool error types

use thiserror::Error;

use super::ToolResult;
use crate::fs::FsError;
use crate::remote::TransportError;

/// Errors that can occur during tool execution
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool {name} timed out after {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u64 },

    #[error("Tool {name} panicked")]
    Panicked { name: String },

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("Error searching documents: {0}")]
    Retrieval(String),
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        ToolResult::failure(err.to_string())
    }
}
