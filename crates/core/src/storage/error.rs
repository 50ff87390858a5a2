use thiserror::Error;

use crate::query::QueryError;

/// Errors that can occur during repository operations.
///
/// Store failures keep the message reported by the store; they are
/// classified, never rewritten or retried here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{operation} condition check failed: {message}")]
    ConditionalCheckFailed {
        operation: &'static str,
        message: String,
    },
    #[error("{operation} throttled: {message}")]
    Throttled {
        operation: &'static str,
        message: String,
    },
    #[error("{operation} failed: {message}")]
    Store {
        operation: &'static str,
        message: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    UnsupportedQuery(#[from] QueryError),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
