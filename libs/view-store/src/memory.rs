//! In-memory document store

use crate::error::StoreError;
use crate::revision;
use crate::traits::DocumentStore;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local store. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<BTreeMap<String, JsonValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<JsonValue, StoreError> {
        revision::read(&*self.documents.read().await, id)
    }

    async fn put(&self, document: JsonValue) -> Result<String, StoreError> {
        let mut documents = self.documents.write().await;
        revision::write(&mut documents, document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryStore::new();
        assert_eq!(
            store.get("nope").await,
            Err(StoreError::NotFound("nope".into()))
        );
    }

    #[tokio::test]
    async fn test_put_then_get_carries_revision() {
        let store = MemoryStore::new();
        let rev = store.put(json!({"_id": "a", "n": 1})).await.unwrap();
        let doc = store.get("a").await.unwrap();
        assert_eq!(doc["_rev"], json!(rev));
        assert_eq!(doc["n"], json!(1));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_documents() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.put(json!({"_id": "a"})).await.unwrap();
        assert!(other.get("a").await.is_ok());
    }
}
