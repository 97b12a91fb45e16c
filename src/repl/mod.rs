//! Interactive REPL and terminal rendering
//!
//! Provides the `toolagent repl` chat loop and the output helpers shared
//! with the one-shot commands.

mod render;
mod session;

pub use render::{partition, print_answer, print_catalog, summarize};
pub use session::ReplSession;

use eyre::Result;

use crate::agent::ToolInvocationLoop;

/// Run the interactive REPL
///
/// This is the main entry point for `toolagent repl`.
pub async fn run_interactive(agent: ToolInvocationLoop) -> Result<()> {
    let mut session = ReplSession::new(agent);
    session.run().await
}
