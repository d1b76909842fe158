//! Campus events error types

use thiserror::Error;

/// Campus events error type
#[derive(Error, Debug)]
pub enum Error {
    /// A draft field is missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// No actor identity is available for the submission
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// The event-creation service rejected the candidate or faulted
    #[error("Service error: {0}")]
    Service(String),

    /// Operation not allowed in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Unknown event or workflow instance
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for campus events operations
pub type Result<T> = std::result::Result<T, Error>;
