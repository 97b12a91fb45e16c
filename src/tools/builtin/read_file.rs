//! read_file tool - read a text file inside the sandbox

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::fs::FileOperations;
use crate::tools::{Tool, ToolError, ToolResult};

/// Read the contents of a file
pub struct ReadFileTool {
    ops: Arc<FileOperations>,
}

impl ReadFileTool {
    pub fn new(ops: Arc<FileOperations>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Read the contents of a file"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to read"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, input: Value) -> ToolResult {
        debug!(?input, "ReadFileTool::execute: called");
        let path = match input["file_path"].as_str() {
            Some(p) => p,
            None => return ToolError::InvalidArguments("file_path is required".to_string()).into(),
        };

        match self.ops.read(path).await {
            Ok(file) => ToolResult::text(file.to_string()),
            Err(e) => ToolError::from(e).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_read_file() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("test.txt"), "line1\nline2").unwrap();
        let tool = ReadFileTool::new(Arc::new(FileOperations::new(temp.path()).unwrap()));

        let result = tool.execute(serde_json::json!({"file_path": "test.txt"})).await;
        assert!(result.success);
        assert_eq!(result.content(), "File: test.txt\n---\nline1\nline2");
    }

    #[tokio::test]
    async fn test_read_missing_argument() {
        let temp = tempdir().unwrap();
        let tool = ReadFileTool::new(Arc::new(FileOperations::new(temp.path()).unwrap()));

        let result = tool.execute(serde_json::json!({"path": "test.txt"})).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("file_path is required"));
    }

    #[tokio::test]
    async fn test_read_outside_sandbox() {
        let temp = tempdir().unwrap();
        let tool = ReadFileTool::new(Arc::new(FileOperations::new(temp.path()).unwrap()));

        let result = tool.execute(serde_json::json!({"file_path": "/etc/passwd"})).await;
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("Permission denied"));
    }
}
