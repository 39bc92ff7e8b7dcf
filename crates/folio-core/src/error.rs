//! Error types for the folio catalog.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using folio's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for catalog operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Upload thread has no entry in the category mapping
    #[error("Unknown category: thread {0} is not mapped")]
    UnknownCategory(i64),

    /// Document metadata does not follow the "Authors: Title" convention
    #[error("Metadata format error: {0}")]
    MetadataFormat(String),

    /// A catalog uniqueness invariant would be broken
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Transport asked us to back off for the given duration
    #[error("Rate limited: retry after {0:?}")]
    RateLimited(Duration),

    /// Transient transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures the delivery policy may recover from or abandon
    /// (rate limiting, transient network errors). Everything else is a
    /// programming or consistency error and must propagate.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::RateLimited(_) | Error::Network(_))
    }
}
