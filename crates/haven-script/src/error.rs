//! Error types for haven-script

use thiserror::Error;

/// Script loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("RON write error: {0}")]
    RonWrite(#[from] ron::Error),

    #[error("Invalid entry: {0}")]
    Invalid(#[from] haven_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for haven_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Invalid(inner) => inner,
            other => haven_core::Error::storage(other),
        }
    }
}
