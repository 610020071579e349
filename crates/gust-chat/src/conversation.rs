//! Conversation state machine: messages, turn gating and outbound history.

use gust_stream::HistoryEntry;

use crate::message::{Message, MessageId};

/// Where the conversation is in the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    /// No turn has run since creation or the last reset
    #[default]
    Idle,
    /// Request sent, no reply text yet
    AwaitingReply { assistant_id: MessageId },
    /// Reply text is arriving
    Streaming { assistant_id: MessageId },
    /// Last turn completed
    Finalized,
    /// Last turn failed
    Failed,
}

impl TurnState {
    /// Whether a turn is in flight
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            TurnState::AwaitingReply { .. } | TurnState::Streaming { .. }
        )
    }

    fn active_target(&self) -> Option<MessageId> {
        match self {
            TurnState::AwaitingReply { assistant_id } | TurnState::Streaming { assistant_id } => {
                Some(*assistant_id)
            }
            _ => None,
        }
    }
}

/// Per-turn state owned by whoever drives the reply stream.
///
/// Handed out by [`Conversation::submit`] and consumed by
/// [`Conversation::finalize`] or [`Conversation::fail`].
#[derive(Debug)]
pub struct StreamSession {
    assistant_id: MessageId,
    accumulated: String,
}

impl StreamSession {
    /// The assistant placeholder this session fills
    pub fn assistant_id(&self) -> MessageId {
        self.assistant_id
    }

    /// Reply text received so far
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }
}

/// A started turn: the session to stream into and the history to send
#[derive(Debug)]
pub struct Turn {
    pub user_id: MessageId,
    pub session: StreamSession,
    pub history: Vec<HistoryEntry>,
}

/// Conversation state: messages, turn state, and the last error.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    state: TurnState,
    last_error: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in conversation order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Whether a turn is in flight (input should be disabled)
    pub fn is_loading(&self) -> bool {
        self.state.is_active()
    }

    /// Error of the most recent failed turn, cleared when a new turn starts
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Look up a message by id
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id() == id)
    }

    /// History to send for a turn whose new user text is `new_content`.
    ///
    /// Streaming, empty and error-tagged messages are left out.
    pub fn outbound_history(&self, new_content: &str) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .filter(|m| m.is_outbound())
            .map(Message::to_history_entry)
            .chain(std::iter::once(HistoryEntry::user(new_content)))
            .collect()
    }

    /// Start a turn.
    ///
    /// Returns `None` without touching state when `content` is blank or a turn
    /// is already in flight.
    pub fn submit(&mut self, content: &str) -> Option<Turn> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        if self.state.is_active() {
            tracing::debug!("rejecting submit while a turn is in flight");
            return None;
        }

        let history = self.outbound_history(content);

        let user = Message::user(content);
        let assistant = Message::assistant_placeholder();
        let user_id = user.id();
        let assistant_id = assistant.id();
        self.messages.push(user);
        self.messages.push(assistant);

        self.state = TurnState::AwaitingReply { assistant_id };
        self.last_error = None;

        Some(Turn {
            user_id,
            session: StreamSession {
                assistant_id,
                accumulated: String::new(),
            },
            history,
        })
    }

    /// Append reply text. Returns `false` if the session is no longer current.
    pub fn apply_delta(&mut self, session: &mut StreamSession, text: &str) -> bool {
        if !self.owns(session) {
            tracing::debug!("dropping delta for superseded turn {}", session.assistant_id);
            return false;
        }

        session.accumulated.push_str(text);
        let Some(message) = self.message_mut(session.assistant_id) else {
            return false;
        };
        message.append(text);
        self.state = TurnState::Streaming {
            assistant_id: session.assistant_id,
        };
        true
    }

    /// Complete the turn with the accumulated reply text.
    pub fn finalize(&mut self, session: StreamSession) -> Option<&Message> {
        if !self.owns(&session) {
            tracing::debug!("ignoring finish for superseded turn {}", session.assistant_id);
            return None;
        }

        self.state = TurnState::Finalized;
        let message = self.message_mut(session.assistant_id)?;
        message.finish(session.accumulated);
        Some(&*message)
    }

    /// Complete the turn as failed with `error`.
    pub fn fail(&mut self, session: StreamSession, error: &str) -> Option<&Message> {
        if !self.owns(&session) {
            tracing::debug!("ignoring failure for superseded turn {}", session.assistant_id);
            return None;
        }

        self.state = TurnState::Failed;
        self.last_error = Some(error.to_string());
        let message = self.message_mut(session.assistant_id)?;
        message.set_error(error);
        Some(&*message)
    }

    /// Clear every message and return to `Idle`, abandoning any in-flight turn.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.state = TurnState::Idle;
        self.last_error = None;
    }

    /// Messages whose content contains `query`, ignoring case.
    ///
    /// A blank query matches every message.
    pub fn search(&self, query: &str) -> Vec<&Message> {
        if query.trim().is_empty() {
            return self.messages.iter().collect();
        }
        let query = query.to_lowercase();
        self.messages
            .iter()
            .filter(|m| m.content().to_lowercase().contains(&query))
            .collect()
    }

    fn owns(&self, session: &StreamSession) -> bool {
        self.state.active_target() == Some(session.assistant_id)
    }

    fn message_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id() == id)
    }
}
