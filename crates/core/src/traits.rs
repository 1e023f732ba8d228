//! Backend contract
//!
//! [`DocumentStore`] is everything the repository needs from persistence:
//! point reads, insert-if-absent, and an atomic conditional write. Any
//! backend with those three operations is interchangeable.

use crate::document::{Payload, StoredDocument};
use crate::error::StoreResult;
use crate::types::{DocumentId, Revision};
use std::sync::Arc;

/// Outcome of [`DocumentStore::insert_if_absent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The document was created
    Inserted,
    /// A document already exists under this id
    AlreadyExists {
        /// Revision of the existing document
        stored: Revision,
    },
}

/// Outcome of [`DocumentStore::compare_and_swap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// Stored revision was older than the proposal; the write committed
    Swapped,
    /// Stored revision was equal to or newer than the proposal; nothing changed
    Conflict {
        /// Revision found in the store
        stored: Revision,
    },
    /// No document exists under this id
    Missing,
}

/// Key-value persistence with atomic single-document conditional writes
///
/// # Contract
///
/// - `get` never mutates state.
/// - `insert_if_absent` creates the document only if the id is free.
/// - `compare_and_swap` commits `(payload, new_revision)` only if the stored
///   revision is strictly less than `new_revision`. The check and the write
///   are one indivisible step with respect to every other writer of the
///   same id. A rejected call leaves the stored document untouched.
/// - `Err` means the backend could not answer. For writes, the caller cannot
///   tell whether the write landed.
pub trait DocumentStore: Send + Sync {
    /// Read the current stored document
    fn get(&self, id: &DocumentId) -> StoreResult<Option<StoredDocument>>;

    /// Create a document if no document exists under `id`
    fn insert_if_absent(
        &self,
        id: DocumentId,
        payload: Payload,
        revision: Revision,
    ) -> StoreResult<InsertOutcome>;

    /// Conditionally replace a document
    ///
    /// Requires `stored revision < new_revision`.
    fn compare_and_swap(
        &self,
        id: DocumentId,
        payload: Payload,
        new_revision: Revision,
    ) -> StoreResult<CasOutcome>;

    /// Make all acknowledged writes durable
    ///
    /// Stores without durability return `Ok(())`.
    fn flush(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Number of stored documents
    fn len(&self) -> usize;

    /// Check if the store holds no documents
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn get(&self, id: &DocumentId) -> StoreResult<Option<StoredDocument>> {
        (**self).get(id)
    }

    fn insert_if_absent(
        &self,
        id: DocumentId,
        payload: Payload,
        revision: Revision,
    ) -> StoreResult<InsertOutcome> {
        (**self).insert_if_absent(id, payload, revision)
    }

    fn compare_and_swap(
        &self,
        id: DocumentId,
        payload: Payload,
        new_revision: Revision,
    ) -> StoreResult<CasOutcome> {
        (**self).compare_and_swap(id, payload, new_revision)
    }

    fn flush(&self) -> StoreResult<()> {
        (**self).flush()
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}
