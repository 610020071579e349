//! Error types for gust-chat

use thiserror::Error;

/// Result type alias using gust-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside of a turn
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the stream/transport layer
    #[error(transparent)]
    Stream(#[from] gust_stream::Error),

    /// Writing an export failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing an export failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
