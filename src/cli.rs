//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::RemoteMode;

/// toolagent - answer questions with a single round of tool calls
#[derive(Parser)]
#[command(
    name = "toolagent",
    about = "Question-answering agent with web, document and sandboxed file tools",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/toolagent/logs/toolagent.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Directory file tools are confined to
    #[arg(short, long, global = true, help = "Directory file tools are confined to")]
    pub base_dir: Option<PathBuf>,

    /// How file tools are provided
    #[arg(short, long, global = true, value_enum, help = "How file tools are provided")]
    pub remote: Option<RemoteMode>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Ask a single question and print the answer
    Ask {
        /// The question
        question: String,
    },

    /// Start an interactive chat session
    Repl,

    /// List the tools available to the agent
    Tools,

    /// Internal: serve the file tools over stdio (used by the process transport)
    #[command(hide = true)]
    McpServer,
}

/// Path of the log file written by interactive commands
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("toolagent")
        .join("logs")
        .join("toolagent.log")
}
