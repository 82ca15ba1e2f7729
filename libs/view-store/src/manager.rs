//! View management over design documents
//!
//! Each operation is one read-modify-write round trip against the [`DocumentStore`].
//! Nothing is cached between calls; the store's revision check is the only guard
//! against concurrent writers, and a lost race comes back as a retryable
//! [`StoreError::Conflict`].

use crate::error::{Result, StoreError, ViewError};
use crate::models::{design_doc_id, DesignDocument, ViewDefinition};
use crate::traits::DocumentStore;
use jsonviews_engine::{CompiledView, ViewCompiler, ViewSpec};
use serde_json::Value;

/// Result of [`ViewManager::put_view`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// The design document was written with this revision.
    Written(String),
    /// The stored definition already matched; nothing was written.
    Unchanged,
}

pub struct ViewManager<S> {
    store: S,
    compiler: ViewCompiler,
}

impl<S: DocumentStore> ViewManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_compiler(store, ViewCompiler::default())
    }

    pub fn with_compiler(store: S, compiler: ViewCompiler) -> Self {
        Self { store, compiler }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch `_design/<group>`, or a bare unsaved one when the store has none.
    ///
    /// # Errors
    /// * Any store error other than `NotFound`
    /// * `MalformedDesignDoc` - If the stored document does not have the design shape
    pub async fn get_or_init_design_doc(&self, group: &str) -> Result<DesignDocument> {
        let id = design_doc_id(group);
        match self.store.get(&id).await {
            Ok(raw) => serde_json::from_value(raw).map_err(|e| ViewError::MalformedDesignDoc {
                id,
                message: e.to_string(),
            }),
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(ddoc = %id, "Design document not found, starting a new one");
                Ok(DesignDocument::new(group))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a view that must not exist yet.
    ///
    /// The existence check and the write are separate round trips; a concurrent writer
    /// shows up as a conflict from the store, not as `DuplicateView`.
    pub async fn add_view(&self, group: &str, name: &str, spec: &ViewSpec) -> Result<String> {
        let mut ddoc = self.get_or_init_design_doc(group).await?;
        if ddoc.has_view(name) {
            return Err(ViewError::DuplicateView {
                group: group.to_string(),
                view: name.to_string(),
            });
        }
        ddoc.views.insert(name.to_string(), definition_json(spec));
        let rev = self.save(&ddoc).await?;
        tracing::info!(ddoc = %ddoc.id, view = name, rev = %rev, "Added view");
        Ok(rev)
    }

    /// Insert or replace a view. Skips the write when the stored definition is equal.
    pub async fn put_view(&self, group: &str, name: &str, spec: &ViewSpec) -> Result<PutOutcome> {
        let mut ddoc = self.get_or_init_design_doc(group).await?;
        let definition = definition_json(spec);
        if ddoc.views.get(name) == Some(&definition) {
            tracing::debug!(ddoc = %ddoc.id, view = name, "View unchanged, skipping write");
            return Ok(PutOutcome::Unchanged);
        }
        ddoc.views.insert(name.to_string(), definition);
        let rev = self.save(&ddoc).await?;
        tracing::info!(ddoc = %ddoc.id, view = name, rev = %rev, "Stored view");
        Ok(PutOutcome::Written(rev))
    }

    /// Delete a view that must exist.
    pub async fn remove_view(&self, group: &str, name: &str) -> Result<String> {
        let mut ddoc = self.get_or_init_design_doc(group).await?;
        if ddoc.views.remove(name).is_none() {
            return Err(ViewError::MissingView {
                group: group.to_string(),
                view: name.to_string(),
            });
        }
        let rev = self.save(&ddoc).await?;
        tracing::info!(ddoc = %ddoc.id, view = name, rev = %rev, "Removed view");
        Ok(rev)
    }

    /// Load and compile a stored view. `None` when the group or view does not exist.
    ///
    /// # Errors
    /// * `MalformedDesignDoc` - If the stored entry is not a declarative view definition
    pub async fn get_view(&self, group: &str, name: &str) -> Result<Option<CompiledView>> {
        let ddoc = self.get_or_init_design_doc(group).await?;
        match ddoc.view(name) {
            None => Ok(None),
            Some(Ok(definition)) => Ok(Some(self.compiler.compile(&definition.spec))),
            Some(Err(e)) => Err(ViewError::MalformedDesignDoc {
                id: ddoc.id,
                message: format!("view '{}': {}", name, e),
            }),
        }
    }

    /// Names of every view in the group, sorted.
    pub async fn list_views(&self, group: &str) -> Result<Vec<String>> {
        let ddoc = self.get_or_init_design_doc(group).await?;
        let mut names: Vec<String> = ddoc.views.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn save(&self, ddoc: &DesignDocument) -> Result<String> {
        let raw = serde_json::to_value(ddoc).map_err(|e| ViewError::MalformedDesignDoc {
            id: ddoc.id.clone(),
            message: e.to_string(),
        })?;
        Ok(self.store.put(raw).await?)
    }
}

fn definition_json(spec: &ViewSpec) -> Value {
    ViewDefinition::from(spec.clone()).to_json()
}
