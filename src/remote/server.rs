//! FsToolServer - serves the file tools over line-framed JSON-RPC
//!
//! This is the far end of [`super::StdioTransport`]; the binary runs it
//! as the `mcp-server` subcommand on its own stdin and stdout.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::TransportError;
use super::protocol::{
    CallToolParams, CallToolResult, IncomingMessage, JsonRpcError, JsonRpcResponse, METHOD_INITIALIZE,
    METHOD_PING, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST, PROTOCOL_VERSION, RemoteTool,
};
use crate::fs::FileOperations;
use crate::tools::builtin::file_tools;
use crate::tools::{Tool, ToolError};

/// Server name reported during `initialize`
pub const SERVER_NAME: &str = "filesystem";

/// JSON-RPC server exposing the five file tools
pub struct FsToolServer {
    tools: Vec<Arc<dyn Tool>>,
}

impl FsToolServer {
    pub fn new(ops: Arc<FileOperations>) -> Self {
        Self { tools: file_tools(ops) }
    }

    /// Serve until the reader reaches end of stream
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), TransportError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(tool_count = %self.tools.len(), "Tool server listening");
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(trimmed).await {
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                writer.write_all(out.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("Tool server input closed");
        Ok(())
    }

    /// Handle one raw line; `None` when no response is due
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let message: IncomingMessage = match serde_json::from_str(line) {
            Ok(m) => m,
            Err(e) => {
                warn!(%e, "FsToolServer::handle_line: unparseable message");
                return Some(JsonRpcResponse::failure(None, JsonRpcError::parse_error()));
            }
        };
        self.handle(message).await
    }

    /// Handle one parsed message; notifications get no response
    pub async fn handle(&self, message: IncomingMessage) -> Option<JsonRpcResponse> {
        debug!(method = %message.method, id = ?message.id, "FsToolServer::handle: called");
        let id = match message.id {
            Some(id) => id,
            None => {
                debug!(method = %message.method, "FsToolServer::handle: notification");
                return None;
            }
        };

        let outcome = match message.method.as_str() {
            METHOD_INITIALIZE => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                }
            })),
            METHOD_PING => Ok(json!({})),
            METHOD_TOOLS_LIST => Ok(self.list_tools()),
            METHOD_TOOLS_CALL => self.call_tool(message.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(Some(id), result),
            Err(error) => JsonRpcResponse::failure(Some(id), error),
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<RemoteTool> = self.tools.iter().map(|t| RemoteTool::from(&t.descriptor())).collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e)))?;
        debug!(name = %params.name, "FsToolServer::call_tool: called");

        let result = match self.tools.iter().find(|t| t.name() == params.name) {
            Some(tool) => tool.execute(params.arguments).await,
            None => ToolError::UnknownTool { name: params.name }.into(),
        };

        let reply = if result.success {
            CallToolResult::text(result.content(), false)
        } else {
            CallToolResult::text(result.error.unwrap_or_default(), true)
        };

        serde_json::to_value(reply).map_err(|e| JsonRpcError::invalid_params(e.to_string()))
    }
}
