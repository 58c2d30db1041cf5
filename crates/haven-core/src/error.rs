//! Error types for haven-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("No pending action, or the confirmation window has elapsed")]
    Expired,

    #[error("Name mismatch: expected {expected}, got {got}")]
    NameMismatch { expected: String, got: String },

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl Error {
    /// Wrap any displayable storage error
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Error::Storage(err.to_string())
    }

    /// Whether the error came from a persistence collaborator
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
