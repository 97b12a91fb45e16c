//! StdioTransport - tool server in a child process, JSON-RPC over its stdio

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::io::BufReader;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::channel::JsonRpcChannel;
use super::protocol::{
    CallToolResult, ListToolsResult, METHOD_INITIALIZE, METHOD_INITIALIZED, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
    initialize_params,
};
use super::{RemoteToolTransport, TransportError};
use crate::tools::{ToolDescriptor, ToolError, ToolResult};

/// Environment variable carrying the base directory to the server process
pub const BASE_DIR_ENV: &str = "FS_MCP_BASE_DIR";

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

struct Connection {
    child: Child,
    channel: JsonRpcChannel<BufReader<ChildStdout>, ChildStdin>,
}

/// Runs a tool server as a child process
///
/// The connection sits behind a mutex, so requests on one transport are
/// serialized and at most one is in flight.
pub struct StdioTransport {
    command: PathBuf,
    args: Vec<String>,
    request_timeout: Duration,
    connection: Mutex<Option<Connection>>,
    catalog: RwLock<Vec<ToolDescriptor>>,
    connected: AtomicBool,
}

impl StdioTransport {
    pub fn new(command: impl Into<PathBuf>, args: Vec<String>, request_timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            request_timeout,
            connection: Mutex::new(None),
            catalog: RwLock::new(Vec::new()),
            connected: AtomicBool::new(false),
        }
    }

    fn spawn(&self, base_dir: &Path) -> Result<Connection, TransportError> {
        info!(command = ?self.command, args = ?self.args, "Spawning tool server");

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .env(BASE_DIR_ENV, base_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TransportError::Spawn {
                command: self.command.display().to_string(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::Malformed("failed to capture stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Malformed("failed to capture stdout".to_string()))?;

        Ok(Connection {
            child,
            channel: JsonRpcChannel::new(BufReader::new(stdout), stdin),
        })
    }

    async fn request(&self, conn: &mut Connection, method: &str, params: Option<Value>) -> Result<Value, TransportError> {
        match tokio::time::timeout(self.request_timeout, conn.channel.request(method, params)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                method: method.to_string(),
                timeout_ms: self.request_timeout.as_millis() as u64,
            }),
        }
    }

    async fn handshake(&self, conn: &mut Connection) -> Result<Vec<ToolDescriptor>, TransportError> {
        let init = self
            .request(
                conn,
                METHOD_INITIALIZE,
                Some(initialize_params(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))),
            )
            .await?;
        debug!(server_info = ?init.get("serverInfo"), "StdioTransport::handshake: initialized");

        conn.channel.notify(METHOD_INITIALIZED, None).await?;

        let listed = self.request(conn, METHOD_TOOLS_LIST, None).await?;
        let listed: ListToolsResult = serde_json::from_value(listed)?;
        Ok(listed.tools.into_iter().map(ToolDescriptor::from).collect())
    }

    async fn call(&self, name: &str, arguments: Value) -> Result<CallToolResult, TransportError> {
        let mut guard = self.connection.lock().await;
        let conn = guard.as_mut().ok_or(TransportError::NotConnected)?;

        let outcome = self
            .request(
                conn,
                METHOD_TOOLS_CALL,
                Some(json!({"name": name, "arguments": arguments})),
            )
            .await
            .and_then(|value| Ok(serde_json::from_value::<CallToolResult>(value)?));

        match outcome {
            Ok(result) => Ok(result),
            Err(e) => {
                if e.is_fatal() {
                    warn!(%e, "StdioTransport::call: connection lost");
                    if let Some(conn) = guard.take() {
                        self.mark_disconnected();
                        shutdown(conn).await;
                    }
                }
                Err(e)
            }
        }
    }

    fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::SeqCst);
        if let Ok(mut catalog) = self.catalog.write() {
            catalog.clear();
        }
    }
}

/// Close stdin so the server can exit, then kill it if it lingers
async fn shutdown(conn: Connection) {
    let Connection { mut child, channel } = conn;
    drop(channel);

    match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
        Ok(Ok(status)) => debug!(%status, "shutdown: tool server exited"),
        Ok(Err(e)) => debug!(%e, "shutdown: wait failed"),
        Err(_) => {
            debug!("shutdown: tool server did not exit, killing");
            if let Err(e) = child.kill().await {
                warn!(%e, "Failed to kill tool server");
            }
        }
    }
}

#[async_trait]
impl RemoteToolTransport for StdioTransport {
    fn kind(&self) -> &'static str {
        "process"
    }

    async fn connect(&self, base_dir: &Path) -> bool {
        debug!(?base_dir, "StdioTransport::connect: called");
        let mut guard = self.connection.lock().await;

        if let Some(old) = guard.take() {
            debug!("StdioTransport::connect: replacing existing connection");
            self.mark_disconnected();
            shutdown(old).await;
        }

        let mut conn = match self.spawn(base_dir) {
            Ok(c) => c,
            Err(e) => {
                warn!(%e, "Failed to start tool server");
                return false;
            }
        };

        match self.handshake(&mut conn).await {
            Ok(tools) => {
                info!(tool_count = %tools.len(), "Connected to tool server");
                if let Ok(mut catalog) = self.catalog.write() {
                    *catalog = tools;
                }
                *guard = Some(conn);
                self.connected.store(true, Ordering::SeqCst);
                true
            }
            Err(e) => {
                warn!(%e, "Tool server handshake failed");
                shutdown(conn).await;
                false
            }
        }
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        match self.catalog.read() {
            Ok(catalog) => catalog.clone(),
            Err(_) => Vec::new(),
        }
    }

    async fn invoke(&self, name: &str, arguments: Value) -> ToolResult {
        debug!(%name, "StdioTransport::invoke: called");
        match self.call(name, arguments).await {
            Ok(result) if result.is_error => ToolResult::failure(result.joined_text()),
            Ok(result) => ToolResult::text(result.joined_text()),
            Err(e) => ToolError::from(e).into(),
        }
    }

    async fn disconnect(&self) {
        let mut guard = self.connection.lock().await;
        match guard.take() {
            Some(conn) => {
                self.mark_disconnected();
                shutdown(conn).await;
                info!("Disconnected from tool server");
            }
            None => debug!("StdioTransport::disconnect: not connected"),
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
