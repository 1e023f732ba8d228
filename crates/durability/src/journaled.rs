//! Journaled document store
//!
//! A [`ShardedStore`] for state plus a [`Wal`] for durability.
//!
//! ## Write Sequence
//!
//! ```text
//! 1. Acquire commit lock (the journal mutex)
//! 2. Validate against in-memory state (RevisionPolicy)
//! 3. IF rejected: return the outcome, nothing written
//! 4. Append record to journal (DURABILITY POINT)
//! 5. Apply to in-memory state
//! 6. Release commit lock
//! ```
//!
//! Holding the journal lock across validate, append and apply means no other
//! writer can change state between the check and the write. Reads never take
//! the lock.
//!
//! A record that cannot be encoded (for instance one larger than
//! [`crate::encoding::MAX_BODY_LEN`]) is refused before anything is written;
//! the store stays usable. If an append fails part-way, the journal may end in
//! a partial frame. The store is then poisoned: further writes fail until it
//! is reopened, and recovery truncates the partial frame.

use crate::mode::DurabilityMode;
use crate::recovery::{recover, RecoveryResult};
use crate::wal::{Wal, WalRecord, WAL_FILENAME};
use parking_lot::Mutex;
use revisiondb_concurrency::{RevisionPolicy, ValidationResult};
use revisiondb_core::{
    CasOutcome, DocumentId, DocumentStore, InsertOutcome, Payload, Revision, StoreError,
    StoreResult, StoredDocument,
};
use revisiondb_storage::ShardedStore;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

struct Journal {
    wal: Wal,
    poisoned: bool,
}

/// Durable [`DocumentStore`]
pub struct JournaledStore {
    state: ShardedStore,
    /// `None` under [`DurabilityMode::None`]
    journal: Option<Mutex<Journal>>,
    policy: RevisionPolicy,
    mode: DurabilityMode,
    dir: Option<PathBuf>,
    recovery: RecoveryResult,
}

impl JournaledStore {
    /// Store with no journal and no files
    pub fn ephemeral() -> Self {
        Self::ephemeral_with_capacity(0)
    }

    /// Ephemeral store sized for `capacity` documents
    pub fn ephemeral_with_capacity(capacity: usize) -> Self {
        Self {
            state: ShardedStore::with_capacity(capacity),
            journal: None,
            policy: RevisionPolicy::new(),
            mode: DurabilityMode::None,
            dir: None,
            recovery: RecoveryResult::default(),
        }
    }

    /// Open (or create) a store in `dir`, replaying its journal
    ///
    /// [`DurabilityMode::None`] opens an ephemeral store and ignores `dir`.
    pub fn open(dir: impl AsRef<Path>, mode: DurabilityMode) -> StoreResult<Self> {
        Self::open_with_capacity(dir, mode, 0)
    }

    /// [`JournaledStore::open`] with a capacity hint
    pub fn open_with_capacity(
        dir: impl AsRef<Path>,
        mode: DurabilityMode,
        capacity: usize,
    ) -> StoreResult<Self> {
        if !mode.requires_journal() {
            return Ok(Self::ephemeral_with_capacity(capacity));
        }

        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        let wal_path = dir.join(WAL_FILENAME);

        let state = ShardedStore::with_capacity(capacity);
        let recovery = recover(&wal_path, &state)?;
        let wal = Wal::open(&wal_path, mode, recovery.valid_len)?;

        info!(
            dir = %dir.display(),
            mode = mode.description(),
            documents = recovery.documents,
            "journaled store opened"
        );

        Ok(Self {
            state,
            journal: Some(Mutex::new(Journal {
                wal,
                poisoned: false,
            })),
            policy: RevisionPolicy::new(),
            mode,
            dir: Some(dir),
            recovery,
        })
    }

    /// Durability mode in effect
    pub fn durability_mode(&self) -> DurabilityMode {
        self.mode
    }

    /// Store directory, if durable
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Check if this store keeps no journal
    pub fn is_ephemeral(&self) -> bool {
        self.journal.is_none()
    }

    /// What recovery found when the store was opened
    pub fn recovery(&self) -> &RecoveryResult {
        &self.recovery
    }

    /// Total successful writes, including replayed ones
    pub fn commits(&self) -> u64 {
        self.state.commits()
    }

    fn append_and_apply(
        &self,
        journal: &mut Journal,
        id: DocumentId,
        record: WalRecord,
        document: StoredDocument,
    ) -> StoreResult<()> {
        if journal.poisoned {
            return Err(StoreError::unavailable(
                "journal poisoned by an earlier write failure",
            ));
        }
        match journal.wal.append(&record) {
            Ok(()) => {}
            Err(e @ StoreError::Serialization(_)) => {
                warn!(%id, error = %e, "journal record refused");
                return Err(e);
            }
            Err(e) => {
                journal.poisoned = true;
                error!(%id, error = %e, "journal append failed, store poisoned");
                return Err(e);
            }
        }
        self.state.restore(id, document);
        Ok(())
    }
}

impl DocumentStore for JournaledStore {
    fn get(&self, id: &DocumentId) -> StoreResult<Option<StoredDocument>> {
        self.state.get(id)
    }

    fn insert_if_absent(
        &self,
        id: DocumentId,
        payload: Payload,
        revision: Revision,
    ) -> StoreResult<InsertOutcome> {
        let Some(journal) = &self.journal else {
            return self.state.insert_if_absent(id, payload, revision);
        };

        let mut guard = journal.lock();
        if let Err(stored) = self.policy.validate_insert(self.state.revision_of(&id)) {
            return Ok(InsertOutcome::AlreadyExists { stored });
        }

        let document = StoredDocument::new(payload, revision);
        let record = WalRecord::Insert {
            id,
            revision,
            payload: document.payload.clone(),
            updated_at: document.updated_at,
        };
        self.append_and_apply(&mut guard, id, record, document)?;
        Ok(InsertOutcome::Inserted)
    }

    fn compare_and_swap(
        &self,
        id: DocumentId,
        payload: Payload,
        new_revision: Revision,
    ) -> StoreResult<CasOutcome> {
        let Some(journal) = &self.journal else {
            return self.state.compare_and_swap(id, payload, new_revision);
        };

        let mut guard = journal.lock();
        let Some(stored) = self.state.revision_of(&id) else {
            return Ok(CasOutcome::Missing);
        };
        if let ValidationResult::Conflict(conflict) =
            self.policy.validate_against_store(new_revision, stored)
        {
            return Ok(CasOutcome::Conflict {
                stored: conflict.stored,
            });
        }

        let document = StoredDocument::new(payload, new_revision);
        let record = WalRecord::Update {
            id,
            revision: new_revision,
            payload: document.payload.clone(),
            updated_at: document.updated_at,
        };
        self.append_and_apply(&mut guard, id, record, document)?;
        Ok(CasOutcome::Swapped)
    }

    fn flush(&self) -> StoreResult<()> {
        match &self.journal {
            Some(journal) => journal.lock().wal.sync(),
            None => Ok(()),
        }
    }

    fn len(&self) -> usize {
        self.state.len()
    }
}
