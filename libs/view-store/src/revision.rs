//! Revision bookkeeping shared by the bundled stores

use crate::error::StoreError;
use serde_json::Value;
use std::collections::BTreeMap;

pub(crate) fn document_id(document: &Value) -> Result<String, StoreError> {
    document
        .get("_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::InvalidDocument("document has no string '_id'".to_string()))
}

fn document_rev(document: &Value) -> Option<&str> {
    document.get("_rev").and_then(Value::as_str)
}

/// `<generation>-<random>`; the generation increments on every write.
pub(crate) fn next_revision(previous: Option<&str>) -> String {
    let generation = previous
        .and_then(|rev| rev.split_once('-'))
        .and_then(|(n, _)| n.parse::<u64>().ok())
        .unwrap_or(0);
    format!("{}-{}", generation + 1, uuid::Uuid::new_v4().simple())
}

/// Look up a document in an id-keyed map.
pub(crate) fn read(documents: &BTreeMap<String, Value>, id: &str) -> Result<Value, StoreError> {
    documents
        .get(id)
        .cloned()
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

/// Write `document` into an id-keyed map with optimistic concurrency on `_rev`.
pub(crate) fn write(
    documents: &mut BTreeMap<String, Value>,
    mut document: Value,
) -> Result<String, StoreError> {
    let id = document_id(&document)?;
    let current = documents.get(&id).and_then(document_rev);

    if current != document_rev(&document) {
        return Err(StoreError::Conflict { id });
    }

    let rev = next_revision(current);
    match document.as_object_mut() {
        Some(obj) => {
            obj.insert("_rev".into(), Value::String(rev.clone()));
        }
        None => {
            return Err(StoreError::InvalidDocument(format!(
                "document '{}' is not an object",
                id
            )))
        }
    }
    documents.insert(id, document);
    Ok(rev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_next_revision_increments_generation() {
        assert!(next_revision(None).starts_with("1-"));
        assert!(next_revision(Some("7-abc")).starts_with("8-"));
        assert!(next_revision(Some("garbage")).starts_with("1-"));
    }

    #[test]
    fn test_write_requires_current_revision() {
        let mut docs = BTreeMap::new();
        let rev = write(&mut docs, json!({"_id": "a", "n": 1})).unwrap();

        // Stale create.
        assert_eq!(
            write(&mut docs, json!({"_id": "a", "n": 2})),
            Err(StoreError::Conflict { id: "a".into() })
        );
        // Wrong revision.
        assert_eq!(
            write(&mut docs, json!({"_id": "a", "_rev": "9-x", "n": 2})),
            Err(StoreError::Conflict { id: "a".into() })
        );
        // Update of a document that does not exist.
        assert_eq!(
            write(&mut docs, json!({"_id": "b", "_rev": rev.clone()})),
            Err(StoreError::Conflict { id: "b".into() })
        );

        let next = write(&mut docs, json!({"_id": "a", "_rev": rev, "n": 2})).unwrap();
        assert!(next.starts_with("2-"));
        assert_eq!(read(&docs, "a").unwrap()["n"], json!(2));
    }

    #[test]
    fn test_write_rejects_documents_without_id() {
        let mut docs = BTreeMap::new();
        assert!(matches!(
            write(&mut docs, json!({"n": 1})),
            Err(StoreError::InvalidDocument(_))
        ));
    }
}
