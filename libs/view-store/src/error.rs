//! Error types for view management

use thiserror::Error;

/// Document store failures, as reported by a [`DocumentStore`](crate::DocumentStore).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document update conflict: {id}")]
    Conflict { id: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ViewError>;

/// View management errors
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("View '{view}' already exists on ddoc '_design/{group}'")]
    DuplicateView { group: String, view: String },

    #[error("No view '{view}' to remove on ddoc '_design/{group}'")]
    MissingView { group: String, view: String },

    #[error("Invalid view definition: {0}")]
    InvalidView(#[from] jsonviews_engine::Error),

    #[error("Malformed design document '{id}': {message}")]
    MalformedDesignDoc { id: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ViewError {
    /// A concurrent writer won; re-reading and retrying may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ViewError::Store(StoreError::Conflict { .. }))
    }
}
