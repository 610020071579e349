//! JSON export of a conversation

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use gust_stream::Role;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{error::Result, message::Message};

/// One exported message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedMessage {
    pub role: Role,
    pub content: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

/// Snapshot of a conversation written by `/export`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExport {
    /// RFC 3339 time the export was created
    pub export_date: String,
    pub messages: Vec<ExportedMessage>,
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ChatExport {
    /// Build an export of `messages` stamped with `exported_at`
    pub fn new(messages: &[Message], exported_at: DateTime<Utc>) -> Self {
        Self {
            export_date: iso(exported_at),
            messages: messages
                .iter()
                .map(|m| ExportedMessage {
                    role: m.role(),
                    content: m.content().to_string(),
                    timestamp: iso(m.timestamp()),
                })
                .collect(),
        }
    }

    /// Default file name for an export made on `date`
    pub fn default_file_name(date: NaiveDate) -> String {
        format!("weather-chat-{}.json", date.format("%Y-%m-%d"))
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the export to `path`
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Conversation;
    use chrono::TimeZone;

    fn sample() -> Conversation {
        let mut conversation = Conversation::new();
        let mut turn = conversation.submit("weather in Cairo?").unwrap();
        conversation.apply_delta(&mut turn.session, "Hot and dry");
        conversation.finalize(turn.session);
        conversation
    }

    #[test]
    fn test_export_shape() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let export = ChatExport::new(sample().messages(), at);

        assert_eq!(export.export_date, "2025-03-14T09:26:53.000Z");
        assert_eq!(export.messages.len(), 2);
        assert_eq!(export.messages[0].role, Role::User);
        assert_eq!(export.messages[1].content, "Hot and dry");

        let json: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();
        assert_eq!(json["exportDate"], "2025-03-14T09:26:53.000Z");
        assert_eq!(json["messages"][1]["role"], "assistant");
        assert!(json["messages"][0]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_default_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
        assert_eq!(ChatExport::default_file_name(date), "weather-chat-2025-07-04.json");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.json");
        let export = ChatExport::new(sample().messages(), Utc::now());
        export.write_to(&path).unwrap();

        let read: ChatExport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read, export);
    }
}
