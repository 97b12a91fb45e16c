//! ConversationState - the message history of one invocation

use tracing::debug;

use crate::llm::{Message, Role};

/// Ordered, append-only message history
///
/// Owned by a single invocation and dropped with it. Messages are never
/// edited or removed once pushed.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    /// Start a conversation with a system prompt and the user's message
    pub fn new(system_prompt: impl Into<String>, user_message: impl Into<String>) -> Self {
        debug!("ConversationState::new: called");
        Self {
            messages: vec![Message::system(system_prompt), Message::user(user_message)],
        }
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        debug!(role = %message.role.as_str(), "ConversationState::push: called");
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Tool-role messages in the order they were appended
    pub fn tool_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role == Role::Tool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ToolCall;

    #[test]
    fn test_new_starts_with_system_then_user() {
        let state = ConversationState::new("be helpful", "what is rust?");
        assert_eq!(state.len(), 2);
        assert_eq!(state.messages()[0].role, Role::System);
        assert_eq!(state.messages()[1].role, Role::User);
        assert_eq!(state.messages()[1].content.as_deref(), Some("what is rust?"));
    }

    #[test]
    fn test_push_appends_in_order() {
        let mut state = ConversationState::new("sys", "user");
        state.push(Message::assistant_tool_calls(
            None,
            vec![ToolCall::new("a", "search_web", "{}"), ToolCall::new("b", "search_web", "{}")],
        ));
        state.push(Message::tool("a", "search_web", "first"));
        state.push(Message::tool("b", "search_web", "second"));

        let ids: Vec<&str> = state.tool_messages().filter_map(|m| m.tool_call_id.as_deref()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(state.len(), 5);
    }
}
