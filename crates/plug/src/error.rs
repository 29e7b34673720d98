//! Error types for the message protocol

use dom::DomError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlugError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("Invalid JSON message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Incomplete message received: {0}")]
    IncompleteMessage(String),

    #[error("No such listener: {0}")]
    ListenerNotFound(String),

    #[error("Cannot remove unregistered listener: {0}")]
    UnknownListener(String),

    #[error("Listener failed: {0}")]
    Handler(String),

    #[error("Listener panicked: {0}")]
    HandlerPanic(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Outbound channel closed")]
    ChannelClosed,
}

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, PlugError>;

impl PlugError {
    /// Stable category name, used as `context.type` of error envelopes
    pub fn kind(&self) -> &'static str {
        match self {
            PlugError::Dom(err) => err.kind(),
            PlugError::Decode(_) => "DecodeError",
            PlugError::IncompleteMessage(_) => "IncompleteMessage",
            PlugError::ListenerNotFound(_) => "ListenerNotFound",
            PlugError::UnknownListener(_) => "LookupError",
            PlugError::Handler(_) => "HandlerError",
            PlugError::HandlerPanic(_) => "HandlerPanic",
            PlugError::Json(_) => "EncodeError",
            PlugError::Io(_) => "IoError",
            PlugError::ChannelClosed => "ChannelClosed",
        }
    }
}
