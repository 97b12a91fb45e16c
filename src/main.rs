//! toolagent - question-answering agent with a single tool round-trip
//!
//! CLI entry point for one-shot questions, the interactive chat, the tool
//! catalog and the stdio file tool server.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use eyre::{Context, Result};
use tokio::io::BufReader;
use tracing::info;

use toolagent::agent::{LoopOptions, ToolInvocationLoop, ToolSetup};
use toolagent::cli::{Cli, Command, get_log_path};
use toolagent::config::Config;
use toolagent::fs::FileOperations;
use toolagent::llm::create_client;
use toolagent::remote::{BASE_DIR_ENV, FsToolServer};
use toolagent::repl::{print_answer, print_catalog, run_interactive};

fn log_level(verbose: bool) -> tracing::Level {
    if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO }
}

fn setup_logging(verbose: bool) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Write to the log file, not stdout/stderr, so logs never interleave with the chat
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level(verbose).into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

/// stdout carries the protocol, so the tool server logs to stderr
fn setup_server_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level(verbose).into()))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Some(Command::McpServer)) {
        setup_server_logging(cli.verbose);
    } else {
        setup_logging(cli.verbose).context("Failed to setup logging")?;
    }

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(base_dir) = &cli.base_dir {
        config.agent.base_dir = Some(base_dir.clone());
    }
    if let Some(mode) = cli.remote {
        config.remote.mode = mode;
    }

    info!(
        "toolagent loaded config: provider={}, model={}, remote={:?}",
        config.llm.provider, config.llm.model, config.remote.mode
    );

    match cli.command {
        Some(Command::Ask { question }) => cmd_ask(&config, &question).await,
        Some(Command::Repl) => cmd_repl(&config).await,
        Some(Command::Tools) => cmd_tools(&config).await,
        Some(Command::McpServer) => cmd_mcp_server(&config, cli.base_dir.is_some()).await,
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Build the invocation loop, connecting remote tools as configured
async fn build_agent(config: &Config) -> Result<ToolInvocationLoop> {
    config.validate()?;
    let llm = create_client(&config.llm).map_err(|e| eyre::eyre!("Failed to create LLM client: {}", e))?;
    let setup = ToolSetup::from_config(config).await?;

    if setup.source.remote().is_none() && config.remote.mode != toolagent::config::RemoteMode::Off {
        println!(
            "{} Failed to connect to file tools. Continuing with basic tools only.",
            "Warning:".yellow()
        );
    }

    Ok(ToolInvocationLoop::new(
        llm,
        setup.registry,
        setup.source,
        LoopOptions::from_config(config),
    ))
}

/// Answer one question
async fn cmd_ask(config: &Config, question: &str) -> Result<()> {
    let agent = build_agent(config).await?;

    println!("{} {}", "Question:".purple(), question.bold());
    let answer = agent.answer(question).await;
    print_answer(&answer);

    agent.shutdown().await;
    Ok(())
}

/// Run the interactive chat
async fn cmd_repl(config: &Config) -> Result<()> {
    let agent = build_agent(config).await?;
    run_interactive(agent).await
}

/// Print the tool catalog
async fn cmd_tools(config: &Config) -> Result<()> {
    let setup = ToolSetup::from_config(config).await?;
    let registry = setup.registry.with_source(setup.source.clone());

    print_catalog(&registry.list());

    if let Some(transport) = setup.source.remote() {
        transport.disconnect().await;
    }
    Ok(())
}

/// Serve the file tools over stdin/stdout
///
/// The base directory comes from `--base-dir`, then the environment variable
/// set by the process transport, then the configuration.
async fn cmd_mcp_server(config: &Config, explicit_base_dir: bool) -> Result<()> {
    let base_dir = match std::env::var_os(BASE_DIR_ENV) {
        Some(dir) if !explicit_base_dir => PathBuf::from(dir),
        _ => config.agent.resolved_base_dir()?,
    };
    info!(?base_dir, "Starting file tool server");

    let ops = FileOperations::new(&base_dir).context(format!("Invalid base directory {}", base_dir.display()))?;
    let server = FsToolServer::new(Arc::new(ops));

    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("Tool server failed")?;
    Ok(())
}
