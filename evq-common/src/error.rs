//! Error type shared by the questionnaire service and its storage layer
//!
//! Validation failures never appear here: the submission validator
//! accumulates them as data and returns them to the caller verbatim.

use thiserror::Error;

/// Result alias used throughout the questionnaire service
pub type Result<T> = std::result::Result<T, Error>;

/// Failures crossing the storage and configuration boundaries
#[derive(Error, Debug)]
pub enum Error {
    /// The catalog or record store rejected an operation
    #[error("Storage error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem problem around the root folder or catalog file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Root folder or catalog file is unusable as configured
    #[error("Configuration error: {0}")]
    Config(String),

    /// A referenced entity (event, answer record) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Broken invariant the caller cannot recover from, such as an empty
    /// tier catalog or a corrupt persisted record
    #[error("Internal error: {0}")]
    Internal(String),
}
