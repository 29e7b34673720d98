//! Error types for DOM operations
//!
//! Simple, flat error hierarchy. No over-engineering.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Bad HTML syntax at {position}: {message}")]
    Parse { message: String, position: usize },

    #[error("Unexpected close tag: {0}")]
    UnexpectedCloseTag(String),

    #[error("No such attribute: {0}")]
    AttributeNotFound(String),

    #[error("Invalid parent: {0}")]
    InvalidParent(String),

    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Invalid node record: {0}")]
    InvalidRecord(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DomError {
    /// Stable category name, reported to the remote side in error envelopes
    pub fn kind(&self) -> &'static str {
        match self {
            DomError::Selector(_) => "SelectorError",
            DomError::Parse { .. } | DomError::UnexpectedCloseTag(_) => "ParseError",
            DomError::AttributeNotFound(_) => "AttributeError",
            DomError::InvalidParent(_) | DomError::NodeNotFound(_) => "TreeError",
            DomError::InvalidRecord(_) => "InvalidRecord",
            DomError::Json(_) => "DecodeError",
        }
    }
}
