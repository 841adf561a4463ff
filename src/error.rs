//! Error types for fileshelf.

use thiserror::Error;

/// Common error type for fileshelf.
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Database error.
    ///
    /// Wraps errors from the SQLite pool. Errors from sqlx are converted
    /// automatically.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error from the content store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for ShelfError {
    fn from(e: sqlx::Error) -> Self {
        ShelfError::Database(e.to_string())
    }
}

/// Result type alias for fileshelf operations.
pub type Result<T> = std::result::Result<T, ShelfError>;
