//! Error types for haven-hub

use thiserror::Error;

/// Result type for haven-hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in haven-hub
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be parsed or failed validation
    #[error("config error: {0}")]
    Config(String),

    /// Operator command could not be understood
    #[error("usage: {0}")]
    Usage(String),

    /// Named player is not known to the directory
    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    /// Command needs an in-world operator
    #[error("this command needs a position in a world")]
    NoPosition,

    /// Core error
    #[error(transparent)]
    Core(#[from] haven_core::Error),

    /// Catalog or zone file error
    #[error("script error: {0}")]
    Script(#[from] haven_script::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Compile-time check that Error is Send + Sync for thread-safe error propagation.
// This function is never called but will fail to compile if the bound is not satisfied.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
