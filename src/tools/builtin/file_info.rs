//! file_info tool - metadata for a file or directory

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::fs::FileOperations;
use crate::tools::{Tool, ToolError, ToolResult};

/// Get information about a file or directory
pub struct FileInfoTool {
    ops: Arc<FileOperations>,
}

impl FileInfoTool {
    pub fn new(ops: Arc<FileOperations>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl Tool for FileInfoTool {
    fn name(&self) -> &'static str {
        "file_info"
    }

    fn description(&self) -> &'static str {
        "Get information about a file or directory"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file or directory"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let path = match input["path"].as_str() {
            Some(p) => p,
            None => return ToolError::InvalidArguments("path is required".to_string()).into(),
        };
        debug!(%path, "FileInfoTool::execute: called");

        match self.ops.info(path).await {
            Ok(info) => ToolResult::text(info.to_string()),
            Err(e) => ToolError::from(e).into(),
        }
    }
}
