// Error handling module for the ratings platform
// Provides the caller-facing service error and the storage error shared by every store

use thiserror::Error;

/// Main error type returned by every service operation
///
/// Validation and existence errors are detected before any mutation happens.
/// Failures of the secondary aggregate refresh never show up here, see
/// `ratings::aggregation::AggregationWriteFailure`.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// An identifier is not shaped like an ObjectId
    #[error("Invalid {what} ID format: {value:?}")]
    InvalidReference { what: &'static str, value: String },

    /// The addressed record or entity does not exist
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: &'static str, id: String },

    /// A write that needs an author was attempted without one
    #[error("User must be authenticated to {action}")]
    Unauthenticated { action: &'static str },

    /// Scores, details or query parameters failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The primary read or write failed in the backing store
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Validation(errors.to_string())
    }
}

/// Errors raised by store implementations (PostgreSQL or in-memory)
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored document or patch could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The query itself was rejected (e.g. an unusable search pattern)
    #[error("Query error: {0}")]
    Query(String),

    /// The store cannot serve the request right now
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
pub type StoreResult<T> = Result<T, StoreError>;
