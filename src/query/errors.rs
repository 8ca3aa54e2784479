//! # Query Errors
//!
//! Errors raised while translating a raw query into a descriptor.

use thiserror::Error;

/// Result type for query translation
pub type QueryResult<T> = Result<T, QueryError>;

/// Query translation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A bracketed filter operator outside the allowed set
    #[error("Unsupported filter operator '{operator}' on field '{field}'")]
    OperatorRejected { field: String, operator: String },

    /// Requested page size is above the configured ceiling
    #[error("Limit {0} exceeds maximum {1}")]
    LimitExceeded(usize, usize),
}
