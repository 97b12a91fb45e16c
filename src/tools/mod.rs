//! Tool system
//!
//! Tools are registered by name in a [`ToolRegistry`], which also exposes the
//! namespaced tools of an attached remote transport. Every dispatch yields a
//! [`ToolResult`]; failures never escape as errors.

mod descriptor;
mod error;
mod registry;
mod source;
mod traits;

pub mod builtin;

pub use descriptor::ToolDescriptor;
pub use error::ToolError;
pub use registry::{DEFAULT_TOOL_TIMEOUT, REMOTE_DESCRIPTION_PREFIX, REMOTE_PREFIX, ToolRegistry};
pub use source::ToolSource;
pub use traits::{Tool, ToolResult};
