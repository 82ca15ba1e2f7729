//! Core trait for document store backends

use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Minimal document store used to persist design documents
///
/// Documents are JSON objects carrying their id in `_id` and, once stored, their
/// revision in `_rev`. Any backend (CouchDB over HTTP, an embedded database, in-memory,
/// a file) can implement this trait.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the current revision of a document
    ///
    /// # Errors
    /// * `NotFound` - If no document has this id
    async fn get(&self, id: &str) -> Result<JsonValue, StoreError>;

    /// Create or update a document
    ///
    /// Updates must carry the `_rev` they were read at; creates must not carry one.
    ///
    /// # Returns
    /// The new revision
    ///
    /// # Errors
    /// * `Conflict` - If `_rev` is not the current revision
    /// * `InvalidDocument` - If the document has no string `_id`
    async fn put(&self, document: JsonValue) -> Result<String, StoreError>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn get(&self, id: &str) -> Result<JsonValue, StoreError> {
        (**self).get(id).await
    }

    async fn put(&self, document: JsonValue) -> Result<String, StoreError> {
        (**self).put(document).await
    }
}
