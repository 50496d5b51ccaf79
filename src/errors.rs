//! Error types for construct operations

use thiserror::Error;

use crate::domain::ValidationError;

/// Errors that can occur while building a construct tree
#[derive(Debug, Error)]
pub enum ConstructError {
    /// Caller-supplied configuration violated an invariant
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// A node with the same local id already exists in the scope
    #[error("Duplicate id '{id}' in scope '{scope}'")]
    DuplicateId { scope: String, id: String },

    /// Local ids must be non-empty and free of path separators
    #[error("Invalid construct id: {0:?}")]
    InvalidId(String),

    /// A secondary index reached autoscaling without a name
    #[error("Secondary index at position {position} of table '{table}' has no name")]
    MissingIndexName { table: String, position: usize },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for construct operations
pub type ConstructResult<T> = Result<T, ConstructError>;

impl From<serde_json::Error> for ConstructError {
    fn from(err: serde_json::Error) -> Self {
        ConstructError::Serialization(err.to_string())
    }
}
