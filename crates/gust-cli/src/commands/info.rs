//! /info command - show thread and message counts

use super::CommandResult;
use gust_chat::{Conversation, TurnState};
use gust_stream::Role;

pub struct InfoCommand;

impl InfoCommand {
    pub fn execute(conversation: &Conversation, thread_id: &str) -> CommandResult {
        let messages = conversation.messages();
        let user_msgs = messages.iter().filter(|m| m.role() == Role::User).count();
        let assistant_msgs = messages.len() - user_msgs;
        let errors = messages.iter().filter(|m| m.is_error()).count();

        let mut output = String::from("Chat Info\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!("Thread:     {}\n", thread_id));
        output.push_str(&format!("Messages:   {} total\n", messages.len()));
        output.push_str(&format!(
            "            {} user, {} assistant, {} failed\n",
            user_msgs, assistant_msgs, errors
        ));
        output.push_str(&format!("State:      {}", state_label(conversation.state())));

        if let Some(error) = conversation.last_error() {
            output.push_str(&format!("\nLast error: {}", error));
        }

        CommandResult::Message(output)
    }
}

fn state_label(state: TurnState) -> &'static str {
    match state {
        TurnState::Idle => "idle",
        TurnState::AwaitingReply { .. } => "waiting for reply",
        TurnState::Streaming { .. } => "streaming",
        TurnState::Finalized => "ready",
        TurnState::Failed => "last turn failed",
    }
}
