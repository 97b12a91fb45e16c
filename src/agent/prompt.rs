//! System prompt construction

use crate::tools::{REMOTE_PREFIX, ToolDescriptor};

/// Build the system prompt for a catalog
///
/// Lists exactly the tools in `catalog`, numbered in catalog order, so the
/// model is never told about a tool it cannot call.
pub fn system_prompt(catalog: &[ToolDescriptor]) -> String {
    if catalog.is_empty() {
        return "You are a helpful AI assistant. Answer the user's question directly.".to_string();
    }

    let mut prompt = String::from("You are a helpful AI assistant with access to the following tools:\n\n");
    for (i, tool) in catalog.iter().enumerate() {
        prompt.push_str(&format!("{}. {}: {}\n", i + 1, tool.name(), tool.description()));
    }

    prompt.push_str("\nUse tools when appropriate to provide better answers.");
    if catalog.iter().any(|t| t.name().starts_with(REMOTE_PREFIX)) {
        prompt.push_str(" You can read, write, and manage files to help with various tasks.");
    }
    prompt
}
