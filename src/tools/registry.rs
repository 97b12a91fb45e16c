//! ToolRegistry - catalog and name-based dispatch

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

use super::{Tool, ToolDescriptor, ToolError, ToolResult, ToolSource};
use crate::remote::RemoteToolTransport;

/// Name prefix carried by tools served through a remote transport
pub const REMOTE_PREFIX: &str = "mcp_";

/// Description prefix carried by tools served through a remote transport
pub const REMOTE_DESCRIPTION_PREFIX: &str = "[MCP] ";

/// Default bound on a single dispatch
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(60);

/// Holds local tools and an optional remote source, and dispatches calls by name
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    source: ToolSource,
    timeout: Duration,
}

impl ToolRegistry {
    /// Create an empty registry with no remote source
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            source: ToolSource::LocalOnly,
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Register a local tool; a later tool with the same name replaces the earlier one
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        debug!(name = %tool.name(), "ToolRegistry::register: called");
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    /// Attach the tool source consulted for namespaced remote tools
    pub fn with_source(mut self, source: ToolSource) -> Self {
        debug!(?source, "ToolRegistry::with_source: called");
        self.source = source;
        self
    }

    /// Bound each dispatch by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn source(&self) -> &ToolSource {
        &self.source
    }

    /// Current catalog: local tools in registration order, then remote tools
    pub fn list(&self) -> Vec<ToolDescriptor> {
        let mut descriptors: Vec<ToolDescriptor> = self.tools.iter().map(|t| t.descriptor()).collect();

        if let Some(transport) = self.source.remote()
            && transport.is_connected()
        {
            descriptors.extend(
                transport
                    .tools()
                    .iter()
                    .map(|d| d.namespaced(REMOTE_PREFIX, REMOTE_DESCRIPTION_PREFIX)),
            );
        }

        debug!(count = %descriptors.len(), "ToolRegistry::list: catalog built");
        descriptors
    }

    /// Names of every tool in the current catalog
    pub fn names(&self) -> Vec<String> {
        self.list().into_iter().map(|d| d.name().to_string()).collect()
    }

    /// Check if a tool exists in the current catalog
    pub fn has_tool(&self, name: &str) -> bool {
        self.list().iter().any(|d| d.name() == name)
    }

    /// Execute a tool by name
    ///
    /// Always yields exactly one result: unknown names, timeouts and panicking
    /// handlers become failed results.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> ToolResult {
        debug!(%name, "ToolRegistry::dispatch: called");

        let call = match self.route(name) {
            Some(call) => call,
            None => {
                debug!(%name, "ToolRegistry::dispatch: unknown tool");
                return ToolError::UnknownTool { name: name.to_string() }.into();
            }
        };

        let guarded = AssertUnwindSafe(async move {
            match call {
                Route::Local(tool) => tool.execute(arguments).await,
                Route::Remote(transport, remote_name) => transport.invoke(&remote_name, arguments).await,
            }
        })
        .catch_unwind();

        match tokio::time::timeout(self.timeout, guarded).await {
            Ok(Ok(result)) => {
                debug!(%name, success = %result.success, "ToolRegistry::dispatch: completed");
                result
            }
            Ok(Err(_)) => {
                warn!(%name, "ToolRegistry::dispatch: tool panicked");
                ToolError::Panicked { name: name.to_string() }.into()
            }
            Err(_) => {
                warn!(%name, timeout_ms = %self.timeout.as_millis(), "ToolRegistry::dispatch: tool timed out");
                ToolError::Timeout {
                    name: name.to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                }
                .into()
            }
        }
    }

    fn route(&self, name: &str) -> Option<Route> {
        if let Some(tool) = self.tools.iter().find(|t| t.name() == name) {
            return Some(Route::Local(tool.clone()));
        }

        let remote_name = name.strip_prefix(REMOTE_PREFIX)?;
        let transport = self.source.remote()?;
        if !transport.is_connected() || !transport.tools().iter().any(|d| d.name() == remote_name) {
            return None;
        }
        Some(Route::Remote(transport.clone(), remote_name.to_string()))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

enum Route {
    Local(Arc<dyn Tool>),
    Remote(Arc<dyn RemoteToolTransport>, String),
}
