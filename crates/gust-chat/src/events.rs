//! Chat event types

use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageId};

/// Events emitted while a chat session runs turns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A turn started: the user message and the empty assistant placeholder
    TurnStart { user: Message, assistant: Message },

    /// Reply text arrived for the assistant placeholder. `content` is the
    /// whole reply so far, so a receiver that missed earlier deltas can catch up.
    Delta {
        message_id: MessageId,
        text: String,
        content: String,
    },

    /// The reply finished
    TurnEnd { message: Message },

    /// The turn failed; the assistant message now carries the error
    TurnError { message: Message, error: String },

    /// The conversation was cleared
    Cleared,
}

impl ChatEvent {
    /// Check if this event ends a turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::TurnEnd { .. } | ChatEvent::TurnError { .. })
    }
}
