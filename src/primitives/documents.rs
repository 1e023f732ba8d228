//! Document primitive.
//!
//! Revisioned documents with optimistic concurrency. Every update proposes
//! the snapshot's revision plus one and commits only if nobody else got
//! there first.
//!
//! # Example
//!
//! ```ignore
//! use revisiondb::prelude::*;
//!
//! let db = RevisionDb::ephemeral()?;
//! let id = DocumentId::new();
//!
//! let mut doc = db.documents.add(id, json!({"balance": 10}))?;
//! doc.payload["balance"] = json!(20);
//! db.documents.update(&mut doc)?;          // revision 2
//!
//! // Read-modify-write with retry on conflict
//! db.documents.update_with(id, |p: &mut serde_json::Value| {
//!     p["balance"] = json!(p["balance"].as_i64().unwrap_or(0) + 1);
//! })?;
//! ```

use crate::error::Result;
use crate::types::{Document, DocumentId, Revision};
use revisiondb_durability::JournaledStore;
use revisiondb_engine::DocumentRepository;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Document operations.
///
/// Access via `db.documents`.
pub struct Documents {
    repo: Arc<DocumentRepository<JournaledStore>>,
}

impl Documents {
    pub(crate) fn new(repo: Arc<DocumentRepository<JournaledStore>>) -> Self {
        Self { repo }
    }

    /// Create a document at revision 1.
    ///
    /// Fails with [`crate::Error::AlreadyExists`] if the id is taken.
    pub fn add<P: Serialize>(&self, id: DocumentId, payload: P) -> Result<Document<P>> {
        Ok(self.repo.add(id, payload)?)
    }

    /// Import a document at an explicit starting revision.
    pub fn seed<P: Serialize>(
        &self,
        id: DocumentId,
        payload: P,
        revision: Revision,
    ) -> Result<Document<P>> {
        Ok(self.repo.seed(id, payload, revision)?)
    }

    /// Read a document.
    ///
    /// Fails with [`crate::Error::NotFound`] if it does not exist.
    pub fn get<P: DeserializeOwned>(&self, id: DocumentId) -> Result<Document<P>> {
        Ok(self.repo.get(id)?)
    }

    /// Read a document, returning `None` if it does not exist.
    pub fn find<P: DeserializeOwned>(&self, id: DocumentId) -> Result<Option<Document<P>>> {
        Ok(self.repo.find(id)?)
    }

    /// Check whether a document exists.
    pub fn exists(&self, id: DocumentId) -> Result<bool> {
        Ok(self.repo.exists(id)?)
    }

    /// Commit the snapshot at its revision plus one.
    ///
    /// Advances `document.revision` on success. On
    /// [`crate::Error::Conflict`] nothing changes, the snapshot included.
    pub fn update<P: Serialize>(&self, document: &mut Document<P>) -> Result<Revision> {
        Ok(self.repo.update(document)?)
    }

    /// Read, apply `mutate`, and update, retrying on conflict.
    ///
    /// Attempts and backoff follow the database's [`crate::RetryPolicy`].
    pub fn update_with<P, F>(&self, id: DocumentId, mutate: F) -> Result<Document<P>>
    where
        P: Serialize + DeserializeOwned,
        F: FnMut(&mut P),
    {
        Ok(self.repo.update_with(id, mutate)?)
    }

    /// Number of stored documents.
    pub fn count(&self) -> Result<usize> {
        Ok(self.repo.len()?)
    }
}
