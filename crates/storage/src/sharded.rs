//! Sharded in-memory document store
//!
//! DashMap keyed by DocumentId with an FxHash hasher.
//! Lock-free-ish reads, sharded writes, O(1) lookups.
//!
//! # Design
//!
//! - DashMap: 16-way sharded by default; a read takes only its shard's read lock
//! - FxHash: fast non-crypto hash, ids are random UUIDs already
//! - Conditional writes run while holding the target shard's write lock, so
//!   validation and apply are a single step for every writer of that id
//!
//! # Thread Safety
//!
//! - get(): shard read lock
//! - insert_if_absent() / compare_and_swap(): only lock the target shard
//! - Writes to ids in different shards never contend

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use revisiondb_concurrency::{RevisionPolicy, ValidationResult};
use revisiondb_core::{
    CasOutcome, DocumentId, DocumentStore, InsertOutcome, Payload, Revision, StoreResult,
    StoredDocument,
};
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// In-memory [`DocumentStore`] backed by a sharded map
///
/// # Example
///
/// ```
/// use revisiondb_core::{DocumentId, DocumentStore, InsertOutcome, Payload, Revision};
/// use revisiondb_storage::ShardedStore;
///
/// let store = ShardedStore::new();
/// let id = DocumentId::new();
/// let outcome = store
///     .insert_if_absent(id, Payload::from(&b"v1"[..]), Revision::INITIAL)
///     .unwrap();
/// assert_eq!(outcome, InsertOutcome::Inserted);
/// ```
pub struct ShardedStore {
    documents: DashMap<DocumentId, StoredDocument, FxBuildHasher>,
    policy: RevisionPolicy,
    /// Number of successful writes (inserts and swaps)
    commits: AtomicU64,
}

impl ShardedStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            documents: DashMap::with_hasher(FxBuildHasher::default()),
            policy: RevisionPolicy::new(),
            commits: AtomicU64::new(0),
        }
    }

    /// Create with an expected number of documents
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            documents: DashMap::with_capacity_and_hasher(capacity, FxBuildHasher::default()),
            policy: RevisionPolicy::new(),
            commits: AtomicU64::new(0),
        }
    }

    /// Total successful writes since creation
    #[inline]
    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::Acquire)
    }

    /// Check if a document exists
    #[inline]
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.documents.contains_key(id)
    }

    /// Current revision of a document, if present
    pub fn revision_of(&self, id: &DocumentId) -> Option<Revision> {
        self.documents.get(id).map(|doc| doc.revision)
    }

    /// Install a document without validation
    ///
    /// Used by recovery and by stores that serialize writes themselves and
    /// have already validated the write.
    pub fn restore(&self, id: DocumentId, document: StoredDocument) {
        self.documents.insert(id, document);
        self.commits.fetch_add(1, Ordering::AcqRel);
    }

    /// All documents, sorted by id
    ///
    /// NOTE: collects and sorts; not for hot paths.
    pub fn documents(&self) -> Vec<(DocumentId, StoredDocument)> {
        let mut all: Vec<_> = self
            .documents
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        all.sort_by(|(a, _), (b, _)| a.cmp(b));
        all
    }
}

impl Default for ShardedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for ShardedStore {
    #[inline]
    fn get(&self, id: &DocumentId) -> StoreResult<Option<StoredDocument>> {
        Ok(self.documents.get(id).map(|doc| doc.clone()))
    }

    fn insert_if_absent(
        &self,
        id: DocumentId,
        payload: Payload,
        revision: Revision,
    ) -> StoreResult<InsertOutcome> {
        match self.documents.entry(id) {
            Entry::Occupied(existing) => Ok(InsertOutcome::AlreadyExists {
                stored: existing.get().revision,
            }),
            Entry::Vacant(slot) => {
                slot.insert(StoredDocument::new(payload, revision));
                self.commits.fetch_add(1, Ordering::AcqRel);
                trace!(%id, revision = revision.get(), "inserted");
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    fn compare_and_swap(
        &self,
        id: DocumentId,
        payload: Payload,
        new_revision: Revision,
    ) -> StoreResult<CasOutcome> {
        // The shard write lock is held until `current` drops
        let Some(mut current) = self.documents.get_mut(&id) else {
            return Ok(CasOutcome::Missing);
        };

        match self
            .policy
            .validate_against_store(new_revision, current.revision)
        {
            ValidationResult::Accept => {
                *current = StoredDocument::new(payload, new_revision);
                self.commits.fetch_add(1, Ordering::AcqRel);
                trace!(%id, revision = new_revision.get(), "swapped");
                Ok(CasOutcome::Swapped)
            }
            ValidationResult::Conflict(conflict) => Ok(CasOutcome::Conflict {
                stored: conflict.stored,
            }),
        }
    }

    fn len(&self) -> usize {
        self.documents.len()
    }
}
