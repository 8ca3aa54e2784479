//! Store error types

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a document store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Document failed schema validation
    #[error("Invalid input data. {0}")]
    Validation(String),

    /// Identifier is not a valid document id
    #[error("Invalid _id: {0}")]
    InvalidId(String),

    /// A document with this id already exists
    #[error("Duplicate _id: {0}")]
    DuplicateId(String),

    /// Internal store failure
    #[error("Internal store error: {0}")]
    Internal(String),
}
