//! Chat messages

use chrono::{DateTime, Utc};
use gust_stream::{HistoryEntry, Role};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix marking an assistant message that carries an error
pub const ERROR_PREFIX: &str = "Error: ";

/// Unique message identifier, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single message in the conversation.
///
/// `id`, `role` and `timestamp` are fixed at creation. Content only changes
/// through the owning [`Conversation`](crate::Conversation) while the message
/// is streaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
    streaming: bool,
    is_error: bool,
}

impl Message {
    fn new(role: Role, content: String, streaming: bool) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content,
            timestamp: Utc::now(),
            streaming,
            is_error: false,
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), false)
    }

    /// Create an empty, streaming assistant placeholder
    pub fn assistant_placeholder() -> Self {
        Self::new(Role::Assistant, String::new(), true)
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether the message is still receiving deltas
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Whether the message content describes a failed turn
    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// Whether the message may be sent back to the agent as history
    pub fn is_outbound(&self) -> bool {
        !self.streaming && !self.is_error && !self.content.trim().is_empty()
    }

    /// Role/content view sent to the agent
    pub fn to_history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            role: self.role,
            content: self.content.clone(),
        }
    }

    pub(crate) fn append(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub(crate) fn finish(&mut self, content: String) {
        self.content = content;
        self.streaming = false;
    }

    pub(crate) fn set_error(&mut self, message: &str) {
        self.content = format!("{}{}", ERROR_PREFIX, message);
        self.streaming = false;
        self.is_error = true;
    }
}
