//! Tool-calling agent
//!
//! [`ToolInvocationLoop`] turns one user message into one answer: a first
//! completion with the current tool catalog, at most one round of tool
//! dispatch, and a second completion without tools. [`ToolSetup`] wires the
//! registry and remote transport from configuration.

mod conversation;
mod error;
mod invocation;
mod prompt;
mod setup;

pub use conversation::ConversationState;
pub use error::AgentError;
pub use invocation::{Answer, FALLBACK_ANSWER, LoopOptions, ToolInvocationLoop, ToolRun, Transcript};
pub use prompt::system_prompt;
pub use setup::{ToolSetup, build_transport, connect_source, local_registry};

pub use crate::tools::ToolSource;
