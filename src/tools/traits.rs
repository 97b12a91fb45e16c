//! Tool trait definition

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::ToolDescriptor;

/// A tool that can be called by the LLM
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the LLM tool-call name)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool
    async fn execute(&self, input: Value) -> ToolResult;

    /// Descriptor advertised in the tool catalog
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(self.name(), self.description(), self.input_schema())
    }
}

/// Result of a tool execution
///
/// Serialized as-is into the tool-role message the model reads, so the field
/// names are part of the conversation contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// Create a successful result carrying a JSON payload
    pub fn success(payload: impl Into<Value>) -> Self {
        debug!("ToolResult::success: called");
        Self {
            success: true,
            result: Some(payload.into()),
            error: None,
        }
    }

    /// Create a successful result carrying plain text
    pub fn text(content: impl Into<String>) -> Self {
        Self::success(Value::String(content.into()))
    }

    /// Create a failed result
    pub fn failure(message: impl Into<String>) -> Self {
        debug!("ToolResult::failure: called");
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }

    /// Payload as display text; strings are returned unquoted
    pub fn content(&self) -> String {
        match (&self.result, &self.error) {
            (Some(Value::String(s)), _) => s.clone(),
            (Some(other), _) => other.to_string(),
            (None, Some(e)) => e.clone(),
            (None, None) => String::new(),
        }
    }

    /// JSON text attached to the tool-role message
    pub fn to_message_content(&self) -> String {
        match serde_json::to_string(self) {
            Ok(s) => s,
            Err(e) => format!(r#"{{"success":false,"error":"failed to serialize tool result: {}"}}"#, e),
        }
    }
}
