//! ToolDescriptor - catalog entry for one tool

use std::collections::BTreeSet;

use serde_json::{Value, json};

/// Name, description and parameter schema of a callable tool
///
/// Immutable once built; derive a namespaced copy with [`ToolDescriptor::namespaced`].
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    parameters: Value,
    required: BTreeSet<String>,
}

impl ToolDescriptor {
    /// Build a descriptor; required parameters are read from the schema's `required` array
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        let required = parameters["required"]
            .as_array()
            .map(|names| names.iter().filter_map(|n| n.as_str().map(String::from)).collect())
            .unwrap_or_default();

        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            required,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// Copy with a name prefix and a description prefix
    pub fn namespaced(&self, name_prefix: &str, description_prefix: &str) -> Self {
        Self {
            name: format!("{}{}", name_prefix, self.name),
            description: format!("{}{}", description_prefix, self.description),
            parameters: self.parameters.clone(),
            required: self.required.clone(),
        }
    }

    /// Function-calling catalog entry for chat-completions APIs
    pub fn to_openai_schema(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}
