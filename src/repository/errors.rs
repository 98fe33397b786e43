use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The document store request failed; carries the backend error as is.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// A stored document could not be decoded into the domain model.
    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Convenient alias for results returned from repository functions.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
