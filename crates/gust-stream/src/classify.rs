//! Classification of decoded stream lines into events
//!
//! Each line of the agent's response body starts with a one-character frame
//! tag and a colon:
//!
//! | tag | meaning | result |
//! |-----|---------|--------|
//! | `f` | metadata (`{"messageId": ...}`) | [`StreamEvent::Skip`] |
//! | `0` | content delta (`"text"`) | [`StreamEvent::ContentDelta`] |
//! | `e` | end of step (`{"finishReason": ...}`) | [`StreamEvent::Finish`] on `"stop"` |
//! | `d` | final data | [`StreamEvent::Finish`] |

use serde_json::Value;
use thiserror::Error;

/// Event produced from one complete stream line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental reply text
    ContentDelta(String),
    /// The reply is complete
    Finish,
    /// Informational or empty frame with no effect
    Skip,
}

/// A line that could not be classified.
///
/// Never escalated past the stream consumer; the line is logged and dropped.
#[derive(Error, Debug)]
pub enum MalformedLine {
    /// Frame tag not part of the protocol
    #[error("unknown frame prefix in line: {0}")]
    UnknownPrefix(String),

    /// Frame payload was not valid JSON
    #[error("invalid '{tag}' frame payload: {source}")]
    InvalidPayload {
        tag: char,
        #[source]
        source: serde_json::Error,
    },
}

/// Classify one decoded line.
pub fn classify_line(line: &str) -> Result<StreamEvent, MalformedLine> {
    if let Some(payload) = line.strip_prefix("f:") {
        let frame = parse_payload('f', payload)?;
        if frame.get("messageId").is_some() {
            tracing::trace!("skipping message id frame");
        }
        Ok(StreamEvent::Skip)
    } else if let Some(payload) = line.strip_prefix("0:") {
        let delta = payload.replace('"', "");
        if delta.trim().is_empty() {
            Ok(StreamEvent::Skip)
        } else {
            Ok(StreamEvent::ContentDelta(delta))
        }
    } else if let Some(payload) = line.strip_prefix("e:") {
        let frame = parse_payload('e', payload)?;
        match frame.get("finishReason").and_then(Value::as_str) {
            Some("stop") => Ok(StreamEvent::Finish),
            other => {
                tracing::debug!("ignoring non-terminal finish reason: {:?}", other);
                Ok(StreamEvent::Skip)
            }
        }
    } else if line.starts_with("d:") {
        Ok(StreamEvent::Finish)
    } else {
        Err(MalformedLine::UnknownPrefix(line.to_string()))
    }
}

fn parse_payload(tag: char, payload: &str) -> Result<Value, MalformedLine> {
    serde_json::from_str(payload).map_err(|source| MalformedLine::InvalidPayload { tag, source })
}
