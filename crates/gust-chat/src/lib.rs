//! gust-chat: conversation state and turn driving
//!
//! This crate owns the ordered message list of a chat session, gates turns so
//! only one reply streams at a time, and drives each turn through a
//! [`gust_stream::Transport`].

pub mod chat;
pub mod conversation;
pub mod error;
pub mod events;
pub mod export;
pub mod message;

pub use chat::Chat;
pub use conversation::{Conversation, StreamSession, Turn, TurnState};
pub use error::{Error, Result};
pub use events::ChatEvent;
pub use export::{ChatExport, ExportedMessage};
pub use message::{ERROR_PREFIX, Message, MessageId};
