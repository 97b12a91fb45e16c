//! search_files tool - case-insensitive text search below a directory

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::fs::FileOperations;
use crate::tools::{Tool, ToolError, ToolResult};

/// Search for text within files in a directory
pub struct SearchFilesTool {
    ops: Arc<FileOperations>,
}

impl SearchFilesTool {
    pub fn new(ops: Arc<FileOperations>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl Tool for SearchFilesTool {
    fn name(&self) -> &'static str {
        "search_files"
    }

    fn description(&self) -> &'static str {
        "Search for text within files in a directory"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "search_term": {
                    "type": "string",
                    "description": "Text to search for"
                },
                "directory_path": {
                    "type": "string",
                    "description": "Directory to search in",
                    "default": "."
                },
                "file_extension": {
                    "type": "string",
                    "description": "File extension to filter by (e.g., '.py', '.txt')",
                    "default": ""
                }
            },
            "required": ["search_term"]
        })
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let term = match input["search_term"].as_str() {
            Some(t) => t,
            None => return ToolError::InvalidArguments("search_term is required".to_string()).into(),
        };
        let path = input["directory_path"].as_str().unwrap_or(".");
        let extension = input["file_extension"].as_str().unwrap_or("");
        debug!(%term, %path, %extension, "SearchFilesTool::execute: called");

        match self.ops.search(term, path, extension).await {
            Ok(report) => ToolResult::text(report.to_string()),
            Err(e) => ToolError::from(e).into(),
        }
    }
}
