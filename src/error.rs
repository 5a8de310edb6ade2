//! Crate-wide error type.

use std::fmt;

use thiserror::Error;

/// Which direction of the history an empty-stack failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOp {
    Undo,
    Redo,
}

impl fmt::Display for HistoryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undo => f.write_str("undo"),
            Self::Redo => f.write_str("redo"),
        }
    }
}

/// Errors produced by the store, cache, history, upstream client and config layers.
#[derive(Debug, Error)]
pub enum ToneError {
    /// Missing or malformed caller input.
    #[error("{0}")]
    Validation(String),

    /// Undo or redo requested with nothing on the corresponding stack.
    #[error("Nothing to {0}")]
    EmptyHistory(HistoryOp),

    /// The upstream rewriting call failed (transport, HTTP status, or body shape).
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Key-value store connectivity or command failure.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<redis::RedisError> for ToneError {
    fn from(err: redis::RedisError) -> Self {
        Self::Store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ToneError>;
