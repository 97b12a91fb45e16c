//! list_directory tool - list directory contents inside the sandbox

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::fs::FileOperations;
use crate::tools::{Tool, ToolError, ToolResult};

/// List the contents of a directory
pub struct ListDirectoryTool {
    ops: Arc<FileOperations>,
}

impl ListDirectoryTool {
    pub fn new(ops: Arc<FileOperations>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &'static str {
        "list_directory"
    }

    fn description(&self) -> &'static str {
        "List contents of a directory"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "directory_path": {
                    "type": "string",
                    "description": "Path to the directory to list",
                    "default": "."
                }
            }
        })
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let path = input["directory_path"].as_str().unwrap_or(".");
        debug!(%path, "ListDirectoryTool::execute: called");

        match self.ops.list(path).await {
            Ok(listing) => ToolResult::text(listing.to_string()),
            Err(e) => ToolError::from(e).into(),
        }
    }
}
