//! toolagent - question-answering agent with a single tool round-trip
//!
//! A user message goes to a completion service together with the current
//! tool catalog. Any tool calls the model requests are dispatched once, their
//! results are appended to the conversation, and a second completion produces
//! the answer.
//!
//! # Core Concepts
//!
//! - **One Tool Round**: At most one batch of tool calls per question
//! - **Fail Closed**: Every tool call yields a result; failures are data, not panics
//! - **Sandboxed Files**: File tools never touch anything outside the base directory
//! - **Swappable Transports**: File tools run in a child process or in-process behind one contract
//!
//! # Modules
//!
//! - [`agent`] - Invocation loop, conversation state and assembly
//! - [`tools`] - Tool trait, registry and built-in tools
//! - [`fs`] - Sandboxed file operations
//! - [`remote`] - Out-of-process tool transport and the stdio tool server
//! - [`llm`] - Completion client trait and OpenAI-compatible implementation
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//! - [`repl`] - Interactive chat and terminal rendering

pub mod agent;
pub mod cli;
pub mod config;
pub mod fs;
pub mod llm;
pub mod remote;
pub mod repl;
pub mod tools;

// Re-export commonly used types
pub use agent::{AgentError, Answer, ConversationState, LoopOptions, ToolInvocationLoop, ToolSetup, Transcript};
pub use config::{Config, LlmConfig, RemoteMode};
pub use fs::{FileOperations, FsError, Sandbox, SandboxedPath};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, ToolCall};
pub use remote::{FsToolServer, InProcessTransport, RemoteToolTransport, StdioTransport, TransportError};
pub use tools::{Tool, ToolDescriptor, ToolError, ToolRegistry, ToolResult, ToolSource};
