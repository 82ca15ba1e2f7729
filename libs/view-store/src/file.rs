//! Document store backed by a single JSON file

use crate::error::StoreError;
use crate::revision;
use crate::traits::DocumentStore;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Stores every document in one JSON object keyed by `_id`.
///
/// A missing file reads as an empty store. Writes go to a sibling temp file which is
/// then renamed over the original. The lock serialises access within this process
/// only; concurrent processes are not coordinated.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, JsonValue>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(storage_error(&self.path, e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::Storage(format!("{} is not a document map: {}", self.path.display(), e))
        })
    }

    async fn save(&self, documents: &BTreeMap<String, JsonValue>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(documents)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| storage_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage_error(&self.path, e))
    }
}

fn storage_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Storage(format!("{}: {}", path.display(), err))
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn get(&self, id: &str) -> Result<JsonValue, StoreError> {
        let _guard = self.lock.lock().await;
        revision::read(&self.load().await?, id)
    }

    async fn put(&self, document: JsonValue) -> Result<String, StoreError> {
        let _guard = self.lock.lock().await;
        let mut documents = self.load().await?;
        let rev = revision::write(&mut documents, document)?;
        self.save(&documents).await?;
        tracing::debug!(path = %self.path.display(), rev = %rev, "Saved document store");
        Ok(rev)
    }
}
