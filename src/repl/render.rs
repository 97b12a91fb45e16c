//! Terminal rendering of tool runs, answers and the tool catalog

use colored::Colorize;

use crate::agent::{Answer, ToolRun};
use crate::tools::{REMOTE_PREFIX, ToolDescriptor};

/// One-line summary of a tool run
pub fn summarize(run: &ToolRun) -> String {
    if !run.result.success {
        return format!(
            "Tool {} failed: {}",
            run.name,
            run.result.error.as_deref().unwrap_or("Unknown error")
        );
    }

    let found = run
        .result
        .result
        .as_ref()
        .and_then(|r| r["results"].as_array())
        .map(|r| r.len())
        .unwrap_or(0);

    match run.name.strip_prefix(REMOTE_PREFIX) {
        Some("read_file") => "File read successfully".to_string(),
        Some("write_file") => "File written successfully".to_string(),
        Some("list_directory") => "Directory contents retrieved".to_string(),
        Some("search_files") => "File search completed".to_string(),
        Some("file_info") => "File information retrieved".to_string(),
        Some(_) => format!("Remote tool {} executed", run.name),
        None => match run.name.as_str() {
            "search_documents" => format!("Found {} documents", found),
            "search_web" => format!("Found {} web results", found),
            other => format!("Tool {} executed", other),
        },
    }
}

/// Print the tool runs and the answer
pub fn print_answer(answer: &Answer) {
    for run in &answer.tool_runs {
        println!("{} {}", "Using tool:".blue(), run.name);
        if run.result.success {
            println!("  {} {}", "✓".green(), summarize(run));
        } else {
            println!("  {} {}", "✗".yellow(), summarize(run));
        }
    }

    if let Some(error) = &answer.error {
        println!("{} {}", "Error:".red(), error);
    }

    println!();
    println!("{}", "Answer:".green().bold());
    println!("{}", "-".repeat(50).green());
    println!("{}", answer.text);
    println!();
}

/// Split a catalog into local and remote tools, preserving order
pub fn partition(catalog: &[ToolDescriptor]) -> (Vec<&ToolDescriptor>, Vec<&ToolDescriptor>) {
    catalog.iter().partition(|d| !d.name().starts_with(REMOTE_PREFIX))
}

/// Print the catalog grouped into local and remote tools
pub fn print_catalog(catalog: &[ToolDescriptor]) {
    let (local, remote) = partition(catalog);

    println!("{}", "Local tools:".bright_cyan());
    if local.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for tool in local {
        println!("  {:22} {}", tool.name().yellow(), tool.description());
    }

    println!("{}", "Remote tools:".bright_cyan());
    if remote.is_empty() {
        println!("  {}", "(not connected)".dimmed());
    }
    for tool in remote {
        println!("  {:22} {}", tool.name().yellow(), tool.description());
    }
}
