//! /search command - filter messages by text

use super::CommandResult;
use crate::utils::{single_line, truncate_chars};
use gust_chat::Conversation;

const PREVIEW_CHARS: usize = 80;

pub struct SearchCommand;

impl SearchCommand {
    pub fn execute(args: &str, conversation: &Conversation) -> CommandResult {
        if args.is_empty() {
            return CommandResult::Message("Usage: /search <query>".to_string());
        }

        let hits = conversation.search(args);
        if hits.is_empty() {
            return CommandResult::Message(format!("No messages match '{}'.", args));
        }

        let mut output = format!("{} of {} messages match '{}':\n", hits.len(), conversation.len(), args);
        for message in hits {
            output.push_str(&format!(
                "  [{}] {}: {}\n",
                message.timestamp().format("%H:%M:%S"),
                message.role().label(),
                truncate_chars(&single_line(message.content()), PREVIEW_CHARS)
            ));
        }

        CommandResult::Message(output.trim_end().to_string())
    }
}
