//! InProcessTransport - the file tools called directly, without a wire protocol

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{RemoteToolTransport, TransportError};
use crate::fs::FileOperations;
use crate::tools::builtin::file_tools;
use crate::tools::{Tool, ToolDescriptor, ToolError, ToolResult};

/// Serves the file tools from inside this process
#[derive(Default)]
pub struct InProcessTransport {
    tools: RwLock<Vec<Arc<dyn Tool>>>,
    connected: AtomicBool,
}

impl InProcessTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().ok()?;
        tools.iter().find(|t| t.name() == name).cloned()
    }
}

#[async_trait]
impl RemoteToolTransport for InProcessTransport {
    fn kind(&self) -> &'static str {
        "in-process"
    }

    async fn connect(&self, base_dir: &Path) -> bool {
        debug!(?base_dir, "InProcessTransport::connect: called");
        let ops = match FileOperations::new(base_dir) {
            Ok(ops) => Arc::new(ops),
            Err(e) => {
                warn!(%e, "InProcessTransport::connect: invalid base directory");
                return false;
            }
        };

        match self.tools.write() {
            Ok(mut tools) => *tools = file_tools(ops),
            Err(_) => return false,
        }
        self.connected.store(true, Ordering::SeqCst);
        info!(?base_dir, "In-process file tools ready");
        true
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        match self.tools.read() {
            Ok(tools) => tools.iter().map(|t| t.descriptor()).collect(),
            Err(_) => Vec::new(),
        }
    }

    async fn invoke(&self, name: &str, arguments: Value) -> ToolResult {
        debug!(%name, "InProcessTransport::invoke: called");
        if !self.is_connected() {
            return ToolError::from(TransportError::NotConnected).into();
        }

        match self.find(name) {
            Some(tool) => tool.execute(arguments).await,
            None => ToolError::UnknownTool { name: name.to_string() }.into(),
        }
    }

    async fn disconnect(&self) {
        if !self.connected.swap(false, Ordering::SeqCst) {
            debug!("InProcessTransport::disconnect: not connected");
            return;
        }
        if let Ok(mut tools) = self.tools.write() {
            tools.clear();
        }
        info!("In-process file tools released");
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_connect_exposes_file_tools() {
        let temp = tempdir().unwrap();
        let transport = InProcessTransport::new();
        assert!(transport.tools().is_empty());

        assert!(transport.connect(temp.path()).await);
        let names: Vec<String> = transport.tools().iter().map(|d| d.name().to_string()).collect();
        assert_eq!(
            names,
            vec!["read_file", "write_file", "list_directory", "search_files", "file_info"]
        );
    }

    #[tokio::test]
    async fn test_connect_fails_for_missing_base() {
        let temp = tempdir().unwrap();
        let transport = InProcessTransport::new();
        assert!(!transport.connect(&temp.path().join("missing")).await);
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_invoke_round_trip() {
        let temp = tempdir().unwrap();
        let transport = InProcessTransport::new();
        transport.connect(temp.path()).await;

        let write = transport
            .invoke("write_file", json!({"file_path": "notes.txt", "content": "hello"}))
            .await;
        assert_eq!(write.content(), "Successfully wrote 5 bytes to: notes.txt");

        let read = transport.invoke("read_file", json!({"file_path": "notes.txt"})).await;
        assert_eq!(read.content(), "File: notes.txt\n---\nhello");
    }

    #[tokio::test]
    async fn test_invoke_when_disconnected_fails() {
        let transport = InProcessTransport::new();
        let result = transport.invoke("read_file", json!({"file_path": "a"})).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("not connected"));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let temp = tempdir().unwrap();
        let transport = InProcessTransport::new();
        transport.disconnect().await;

        transport.connect(temp.path()).await;
        transport.disconnect().await;
        transport.disconnect().await;
        assert!(!transport.is_connected());
        assert!(transport.tools().is_empty());
    }
}
