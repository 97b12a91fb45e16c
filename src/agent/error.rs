//! Invocation loop errors

use thiserror::Error;

use crate::llm::LlmError;

/// Failures that abort an invocation
///
/// Tool failures never appear here; they travel back to the model as
/// failed results.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Completion service failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("Completion call '{stage}' timed out after {timeout_ms}ms")]
    Timeout { stage: &'static str, timeout_ms: u64 },
}
