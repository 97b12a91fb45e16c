//! Remote tool execution
//!
//! A [`RemoteToolTransport`] exposes tools that live behind a connection.
//! [`StdioTransport`] runs a tool server as a child process and talks
//! line-framed JSON-RPC over its stdio; [`InProcessTransport`] serves the same
//! catalog directly. [`FsToolServer`] is the server side.

mod channel;
mod error;
mod in_process;
mod protocol;
mod server;
mod stdio;
mod transport;

pub use channel::JsonRpcChannel;
pub use error::TransportError;
pub use in_process::InProcessTransport;
pub use protocol::{
    CallToolParams, CallToolResult, Content, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, PROTOCOL_VERSION, RemoteTool,
};
pub use server::{FsToolServer, SERVER_NAME};
pub use stdio::{BASE_DIR_ENV, StdioTransport};
pub use transport::RemoteToolTransport;
