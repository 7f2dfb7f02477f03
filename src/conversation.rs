//! Conversation history for a chat session
//!
//! A conversation is an append-only list of message records. Records are
//! never edited or removed one at a time; the only bulk operation is
//! [`Conversation::clear`], which empties the list.

use crate::providers::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Author of a message record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person at the terminal
    User,
    /// Produced by the completion endpoint (or the fallback text)
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Opaque unique identifier
    pub id: String,
    /// Author of the message
    pub role: Role,
    /// Message text; may span multiple lines
    pub content: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a message record stamped with a fresh id and the current time
    ///
    /// # Examples
    ///
    /// ```
    /// use chatclone::conversation::{ChatMessage, Role};
    ///
    /// let msg = ChatMessage::new(Role::User, "Hello");
    /// assert_eq!(msg.role, Role::User);
    /// assert_eq!(msg.content, "Hello");
    /// assert!(!msg.id.is_empty());
    /// ```
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Converts the record into the `{role, content}` pair sent upstream
    pub fn to_wire(&self) -> Message {
        Message::new(self.role.as_str(), self.content.clone())
    }
}

/// Ordered, append-only message list
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Creates an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user message and returns a copy of the new record
    pub fn push_user(&mut self, content: impl Into<String>) -> ChatMessage {
        self.push(ChatMessage::new(Role::User, content))
    }

    /// Appends an assistant message and returns a copy of the new record
    pub fn push_assistant(&mut self, content: impl Into<String>) -> ChatMessage {
        self.push(ChatMessage::new(Role::Assistant, content))
    }

    fn push(&mut self, message: ChatMessage) -> ChatMessage {
        self.messages.push(message.clone());
        message
    }

    /// All records in send order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true when the conversation has no records
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replaces the list with an empty one
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// The full history as wire messages, in order
    ///
    /// Nothing is trimmed: every prior turn is resent on every request.
    pub fn history(&self) -> Vec<Message> {
        self.messages.iter().map(ChatMessage::to_wire).collect()
    }
}
