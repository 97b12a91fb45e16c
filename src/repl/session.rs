//! REPL session management

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use super::render::{partition, print_answer, print_catalog};
use crate::agent::ToolInvocationLoop;
use crate::tools::ToolDescriptor;

/// What the session should do with one line of input
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    ListTools,
    Help,
    Empty,
    Unknown(&'a str),
    Question(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let input = line.trim();
    match input.to_lowercase().as_str() {
        "" => Input::Empty,
        "quit" | "exit" | "q" | "/quit" | "/exit" | "/q" => Input::Quit,
        "/tools" => Input::ListTools,
        "/help" | "/h" => Input::Help,
        _ if input.starts_with('/') => Input::Unknown(input),
        _ => Input::Question(input),
    }
}

fn join_names(tools: &[&ToolDescriptor]) -> String {
    tools.iter().map(|d| d.name()).collect::<Vec<_>>().join(", ")
}

/// Interactive REPL session
///
/// Each question is an independent invocation; no history is carried
/// between questions.
pub struct ReplSession {
    agent: ToolInvocationLoop,
}

impl ReplSession {
    pub fn new(agent: ToolInvocationLoop) -> Self {
        Self { agent }
    }

    /// Run the REPL main loop, then disconnect remote tools
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        let outcome = loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => match classify(&line) {
                    Input::Empty => println!("{}", "Please enter a question.".yellow()),
                    Input::Quit => break Ok(()),
                    Input::ListTools => print_catalog(&self.agent.registry().list()),
                    Input::Help => self.print_help(),
                    Input::Unknown(cmd) => {
                        println!("{} Unknown command: {}", "?".yellow(), cmd);
                        println!("Type {} for available commands", "/help".yellow());
                    }
                    Input::Question(question) => {
                        let _ = rl.add_history_entry(question);
                        debug!("ReplSession::run: answering question");
                        let answer = self.agent.answer(question).await;
                        print_answer(&answer);
                        println!("{}", "=".repeat(60).blue());
                    }
                },
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break Ok(());
                }
                Err(err) => break Err(eyre::eyre!("Readline error: {}", err)),
            }
        };

        self.agent.shutdown().await;
        println!("{}", "Chat session ended!".green());
        outcome
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "toolagent interactive chat".bright_cyan().bold());
        let catalog = self.agent.registry().list();
        let (local, remote) = partition(&catalog);
        println!("Local tools: {}", join_names(&local).green());
        if !remote.is_empty() {
            println!("Remote tools: {}", join_names(&remote).green());
        }
        println!("Type {} for help, {} to quit", "/help".yellow(), "quit".yellow());
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:14} Show this help", "/help".yellow());
        println!("  {:14} List available tools", "/tools".yellow());
        println!("  {:14} Exit the session", "quit".yellow());
        println!();
    }
}
