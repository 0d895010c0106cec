//! Conversation state, routing, and response extraction

use dbchat_provider::Message;

/// Returned when no assistant message with text content exists.
pub const NO_RESPONSE: &str = "No response generated from the agent.";

/// Ordered, append-only conversation history for one thread.
///
/// Messages are only ever appended; nothing here removes or reorders them.
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    pub messages: Vec<Message>,
}

impl AgentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Destination after the reasoning node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// The last message requests tool calls; run the tool node.
    Tools,
    /// No pending tool calls; the turn is complete.
    Done,
}

/// Conditional edge out of the reasoning node.
///
/// Pure function over the most recent message only: pending tool-call
/// requests route to the tool node, anything else terminates the turn.
pub fn route(state: &AgentState) -> Next {
    match state.last() {
        Some(message) if message.has_tool_calls() => Next::Tools,
        _ => Next::Done,
    }
}

/// Find the final answer: the last assistant message with non-empty text.
///
/// Assistant messages that only carry tool calls are skipped. Falls back
/// to [`NO_RESPONSE`] when the turn produced no text at all.
pub fn extract_response(messages: &[Message]) -> String {
    messages
        .iter()
        .rev()
        .filter(|m| m.role == "assistant")
        .find_map(|m| m.text())
        .map(|s| s.to_string())
        .unwrap_or_else(|| NO_RESPONSE.to_string())
}
