//! Common error types for loomtrack

use thiserror::Error;

/// Common result type for loomtrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across loomtrack crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Referenced worker, record or production entry does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing required field or malformed value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored data could not be decoded
    #[error("Internal error: {0}")]
    Internal(String),
}
