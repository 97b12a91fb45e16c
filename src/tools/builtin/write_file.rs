//! write_file tool - create or overwrite a file inside the sandbox

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::fs::FileOperations;
use crate::tools::{Tool, ToolError, ToolResult};

/// Write content to a file, creating parent directories
pub struct WriteFileTool {
    ops: Arc<FileOperations>,
}

impl WriteFileTool {
    pub fn new(ops: Arc<FileOperations>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn description(&self) -> &'static str {
        "Write content to a file (creates or overwrites)"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to write"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write to the file"
                }
            },
            "required": ["file_path", "content"]
        })
    }

    async fn execute(&self, input: Value) -> ToolResult {
        debug!("WriteFileTool::execute: called");
        let path = match input["file_path"].as_str() {
            Some(p) => p,
            None => return ToolError::InvalidArguments("file_path is required".to_string()).into(),
        };

        let content = match input["content"].as_str() {
            Some(c) => c,
            None => return ToolError::InvalidArguments("content is required".to_string()).into(),
        };

        match self.ops.write(path, content).await {
            Ok(receipt) => ToolResult::text(receipt.to_string()),
            Err(e) => ToolError::from(e).into(),
        }
    }
}
