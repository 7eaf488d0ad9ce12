//! Error types for search service operations.

use thiserror::Error;

/// Search client error type.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Invalid or inconsistent schema. Not retryable; the schema must be fixed.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Transport, authentication, or whole-request throttling failure.
    /// Retryable with backoff at the caller's discretion.
    #[error("Service error: {0}")]
    Service(String),

    /// An index with the requested name already exists.
    #[error("Index already exists: {0}")]
    Conflict(String),

    /// Malformed query referencing unknown or incapable fields.
    #[error("Query error: {0}")]
    Query(String),

    /// Index not found.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Document not found.
    #[error("Document not found: {index}/{key}")]
    DocumentNotFound {
        /// Index name.
        index: String,
        /// Document key.
        key: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation timed out.
    #[error("Operation timed out")]
    Timeout,
}

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
