//! Chat session: runs turns against a transport and broadcasts events

use std::sync::Arc;

use chrono::Utc;
use gust_stream::{
    HttpTransport, RunOptions, StreamHandler, Transport, TurnOutcome, generate_thread_id,
    stream::consume,
};
use tokio::sync::broadcast;

use crate::{
    conversation::{Conversation, StreamSession, Turn},
    events::ChatEvent,
    export::ChatExport,
    message::Message,
};

/// A chat session bound to one agent thread
pub struct Chat {
    conversation: Conversation,
    transport: Arc<dyn Transport>,
    thread_id: String,
    event_tx: broadcast::Sender<ChatEvent>,
}

impl Chat {
    /// Create a session on a freshly generated thread
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            conversation: Conversation::new(),
            transport,
            thread_id: generate_thread_id(),
            event_tx,
        }
    }

    /// Create a session posting to `endpoint` over HTTP
    pub fn from_endpoint(endpoint: &str, options: RunOptions) -> crate::error::Result<Self> {
        let transport = HttpTransport::new(endpoint)?.with_options(options);
        Ok(Self::new(Arc::new(transport)))
    }

    /// Use a fixed thread id instead of the generated one
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = thread_id.into();
        self
    }

    /// Subscribe to chat events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.event_tx.subscribe()
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn is_loading(&self) -> bool {
        self.conversation.is_loading()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.conversation.last_error()
    }

    /// Clear the conversation. The thread id is kept.
    pub fn reset(&mut self) {
        self.conversation.reset();
        let _ = self.event_tx.send(ChatEvent::Cleared);
    }

    /// Messages containing `query`, ignoring case
    pub fn search(&self, query: &str) -> Vec<&Message> {
        self.conversation.search(query)
    }

    /// Snapshot the conversation for export
    pub fn export(&self) -> ChatExport {
        ChatExport::new(self.conversation.messages(), Utc::now())
    }

    /// Run one turn for `content`.
    ///
    /// Returns `None` if the submission was rejected (blank input or a turn
    /// already in flight). Otherwise the turn runs to completion and its
    /// outcome is returned; failures are recorded on the conversation.
    pub async fn submit(&mut self, content: &str) -> Option<TurnOutcome> {
        let Some(Turn {
            user_id,
            session,
            history,
        }) = self.conversation.submit(content)
        else {
            return None;
        };

        if let (Some(user), Some(assistant)) = (
            self.conversation.message(user_id),
            self.conversation.message(session.assistant_id()),
        ) {
            let _ = self.event_tx.send(ChatEvent::TurnStart {
                user: user.clone(),
                assistant: assistant.clone(),
            });
        }

        tracing::debug!(
            "starting turn on {} with {} history entries",
            self.thread_id,
            history.len()
        );

        let body = match self.transport.send(history, &self.thread_id).await {
            Ok(body) => body,
            Err(e) => {
                let error = e.to_string();
                tracing::warn!("Request failed: {}", error);
                let mut driver = TurnDriver::new(&mut self.conversation, session, &self.event_tx);
                driver.on_error(&error);
                return Some(TurnOutcome::Failed(error));
            }
        };

        let mut driver = TurnDriver::new(&mut self.conversation, session, &self.event_tx);
        Some(consume(body, &mut driver).await)
    }
}

/// Applies one turn's reply to the conversation.
///
/// Owns the stream session until a terminal callback hands it back.
struct TurnDriver<'a> {
    conversation: &'a mut Conversation,
    session: Option<StreamSession>,
    events: &'a broadcast::Sender<ChatEvent>,
}

impl<'a> TurnDriver<'a> {
    fn new(
        conversation: &'a mut Conversation,
        session: StreamSession,
        events: &'a broadcast::Sender<ChatEvent>,
    ) -> Self {
        Self {
            conversation,
            session: Some(session),
            events,
        }
    }
}

impl StreamHandler for TurnDriver<'_> {
    fn on_chunk(&mut self, text: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if self.conversation.apply_delta(session, text) {
            let _ = self.events.send(ChatEvent::Delta {
                message_id: session.assistant_id(),
                text: text.to_string(),
                content: session.accumulated().to_string(),
            });
        }
    }

    fn on_finish(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if let Some(message) = self.conversation.finalize(session) {
            let _ = self.events.send(ChatEvent::TurnEnd {
                message: message.clone(),
            });
        }
    }

    fn on_error(&mut self, message: &str) {
        let Some(session) = self.session.take() else {
            return;
        };
        if let Some(failed) = self.conversation.fail(session, message) {
            let _ = self.events.send(ChatEvent::TurnError {
                message: failed.clone(),
                error: message.to_string(),
            });
        }
    }
}
