//! RemoteToolTransport trait

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::{ToolDescriptor, ToolResult};

/// Tool execution behind a connection that may live in another process
///
/// Implementations never surface transport errors to callers: `connect`
/// reports a boolean and `invoke` always yields a [`ToolResult`].
#[async_trait]
pub trait RemoteToolTransport: Send + Sync {
    /// Short label for logs
    fn kind(&self) -> &'static str;

    /// Establish the connection and fetch the tool catalog once
    async fn connect(&self, base_dir: &Path) -> bool;

    /// Catalog fetched at connect time, unprefixed; empty when disconnected
    fn tools(&self) -> Vec<ToolDescriptor>;

    /// Call a tool by its unprefixed name
    async fn invoke(&self, name: &str, arguments: Value) -> ToolResult;

    /// Release the connection; a no-op when not connected
    async fn disconnect(&self);

    fn is_connected(&self) -> bool;
}
