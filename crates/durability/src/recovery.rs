//! Journal replay
//!
//! Rebuilds in-memory state from a journal file.
//!
//! ## Recovery Sequence
//!
//! 1. Read the journal file
//! 2. Decode frames from the start, applying each record to a fresh store
//! 3. Stop at the first incomplete frame (torn tail from a crash mid-append)
//!    or at a tail of zero bytes, and truncate the file to the last complete
//!    frame
//! 4. Any other decode failure, or a record that breaks revision ordering,
//!    is corruption and fails recovery
//!
//! ## Key Principle
//!
//! After recovery the store holds exactly the acknowledged writes, each at the
//! revision it was committed with.

use crate::encoding::{decode_record, DecodeError};
use crate::wal::WalRecord;
use revisiondb_concurrency::RevisionPolicy;
use revisiondb_core::{StoreError, StoreResult, StoredDocument};
use revisiondb_storage::ShardedStore;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Recovery outcome
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Records applied
    pub records_replayed: u64,
    /// Distinct documents after replay
    pub documents: usize,
    /// Length of the valid journal prefix
    pub valid_len: u64,
    /// Bytes dropped from a torn tail
    pub truncated_bytes: u64,
}

impl RecoveryResult {
    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "replayed {} records into {} documents ({} bytes valid, {} truncated)",
            self.records_replayed, self.documents, self.valid_len, self.truncated_bytes
        )
    }
}

/// Replay the journal at `path` into `state`
///
/// A missing file is an empty journal.
pub fn recover(path: &Path, state: &ShardedStore) -> StoreResult<RecoveryResult> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(RecoveryResult::default());
        }
        Err(e) => return Err(e.into()),
    };

    let policy = RevisionPolicy::new();
    let mut result = RecoveryResult::default();
    let mut offset = 0usize;

    while offset < bytes.len() {
        let tail = &bytes[offset..];
        match decode_record(tail, offset as u64) {
            Ok((record, used)) => {
                apply(&policy, state, record, offset as u64)?;
                result.records_replayed += 1;
                offset += used;
            }
            Err(DecodeError::Incomplete { .. }) => {
                result.truncated_bytes = truncate_tail(path, offset, tail.len(), "torn")?;
                break;
            }
            // Preallocated or zeroed blocks after a crash: never a written frame
            Err(_) if is_zero_filled(tail) => {
                result.truncated_bytes = truncate_tail(path, offset, tail.len(), "zero-filled")?;
                break;
            }
            Err(e) => return Err(StoreError::corruption(e.to_string())),
        }
    }

    result.valid_len = offset as u64;
    result.documents = revisiondb_core::DocumentStore::len(state);
    info!(path = %path.display(), "{}", result.summary());
    Ok(result)
}

fn is_zero_filled(tail: &[u8]) -> bool {
    tail.iter().all(|b| *b == 0)
}

fn truncate_tail(path: &Path, offset: usize, dropped: usize, kind: &str) -> StoreResult<u64> {
    warn!(
        path = %path.display(),
        offset,
        dropped,
        "{} journal tail, truncating",
        kind
    );
    OpenOptions::new()
        .write(true)
        .open(path)?
        .set_len(offset as u64)?;
    Ok(dropped as u64)
}

fn apply(
    policy: &RevisionPolicy,
    state: &ShardedStore,
    record: WalRecord,
    offset: u64,
) -> StoreResult<()> {
    match record {
        WalRecord::Insert {
            id,
            revision,
            payload,
            updated_at,
        } => {
            if let Err(stored) = policy.validate_insert(state.revision_of(&id)) {
                return Err(StoreError::corruption(format!(
                    "insert of {} at offset {} over existing revision {}",
                    id, offset, stored
                )));
            }
            state.restore(
                id,
                StoredDocument {
                    payload,
                    revision,
                    updated_at,
                },
            );
        }
        WalRecord::Update {
            id,
            revision,
            payload,
            updated_at,
        } => {
            let stored = state.revision_of(&id).ok_or_else(|| {
                StoreError::corruption(format!(
                    "update of unknown document {} at offset {}",
                    id, offset
                ))
            })?;
            if let Some(conflict) = policy.validate_against_store(revision, stored).conflict() {
                return Err(StoreError::corruption(format!(
                    "update of {} at offset {}: {}",
                    id, offset, conflict
                )));
            }
            state.restore(
                id,
                StoredDocument {
                    payload,
                    revision,
                    updated_at,
                },
            );
        }
    }
    Ok(())
}
