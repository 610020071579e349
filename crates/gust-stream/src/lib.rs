//! gust-stream: wire layer for the weather agent
//!
//! This crate turns the agent's newline-delimited response body into typed
//! events and provides the transport that issues one streaming request per turn.

pub mod classify;
pub mod decoder;
pub mod error;
pub mod stream;
pub mod transport;
pub mod types;

pub use classify::{MalformedLine, StreamEvent, classify_line};
pub use decoder::LineDecoder;
pub use error::{Error, Result};
pub use stream::{
    ByteStream, ReplyEvent, ReplyEventStream, StreamHandler, TurnOutcome, consume, reply_events,
};
pub use transport::{HttpTransport, Transport, generate_thread_id};
pub use types::*;
