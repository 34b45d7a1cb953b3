//! Append-only conversation log.

use zion_core::types::{ConversationMessage, Role};

/// Ordered messages of one session. Nothing is ever edited or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLog {
    messages: Vec<ConversationMessage>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent assistant message.
    pub fn last_assistant(&self) -> Option<&ConversationMessage> {
        self.messages.iter().rev().find(|m| m.role() == Role::Assistant)
    }
}
