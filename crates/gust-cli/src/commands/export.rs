//! /export command - save the conversation as JSON

use super::CommandResult;
use chrono::Utc;
use gust_chat::{ChatExport, Conversation};
use std::path::PathBuf;

pub struct ExportCommand;

impl ExportCommand {
    /// Write the conversation to `args`, or to the dated default file name
    /// in the current directory when no path is given.
    pub fn execute(args: &str, conversation: &Conversation) -> CommandResult {
        if conversation.is_empty() {
            return CommandResult::Message("No messages to export.".to_string());
        }

        let now = Utc::now();
        let path = if args.is_empty() {
            PathBuf::from(ChatExport::default_file_name(now.date_naive()))
        } else {
            PathBuf::from(args)
        };

        let export = ChatExport::new(conversation.messages(), now);
        match export.write_to(&path) {
            Ok(()) => CommandResult::Message(format!(
                "Exported {} messages to {}",
                export.messages.len(),
                path.display()
            )),
            Err(e) => CommandResult::Message(format!("Export failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exports_to_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.json");

        let mut conversation = Conversation::new();
        let mut turn = conversation.submit("Weather in Lima?").unwrap();
        conversation.apply_delta(&mut turn.session, "Cloudy, 18°C");
        conversation.finalize(turn.session);

        match ExportCommand::execute(path.to_str().unwrap(), &conversation) {
            CommandResult::Message(text) => assert!(text.starts_with("Exported 2 messages")),
            other => panic!("unexpected result: {:?}", other),
        }

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(written["exportDate"].is_string());
        assert_eq!(written["messages"][0]["role"], "user");
        assert_eq!(written["messages"][1]["content"], "Cloudy, 18°C");
    }

    #[test]
    fn test_empty_conversation_is_not_exported() {
        match ExportCommand::execute("", &Conversation::new()) {
            CommandResult::Message(text) => assert_eq!(text, "No messages to export."),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_reports_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chat.json");

        let mut conversation = Conversation::new();
        conversation.submit("hi").unwrap();

        match ExportCommand::execute(path.to_str().unwrap(), &conversation) {
            CommandResult::Message(text) => assert!(text.starts_with("Export failed")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
