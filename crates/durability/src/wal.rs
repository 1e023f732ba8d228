//! Write-ahead journal
//!
//! Every committed write is appended as a [`WalRecord`] before it becomes
//! visible in memory. Replaying the journal from the start rebuilds the
//! exact set of acknowledged documents.
//!
//! Records carry the full payload and the revision being committed, so
//! replay needs no prior state.

use crate::encoding::encode_record;
use crate::mode::DurabilityMode;
use revisiondb_core::{DocumentId, Payload, Revision, StoreError, StoreResult, Timestamp};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Journal file name inside a store directory
pub const WAL_FILENAME: &str = "documents.wal";

/// Journal record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum WalRecord {
    /// Document created
    Insert {
        /// Document id
        id: DocumentId,
        /// Initial revision
        revision: Revision,
        /// Initial payload
        payload: Payload,
        /// Commit time
        updated_at: Timestamp,
    },

    /// Conditional write committed
    Update {
        /// Document id
        id: DocumentId,
        /// Revision committed
        revision: Revision,
        /// New payload
        payload: Payload,
        /// Commit time
        updated_at: Timestamp,
    },
}

impl WalRecord {
    /// Id of the document this record writes
    pub fn id(&self) -> DocumentId {
        match self {
            WalRecord::Insert { id, .. } | WalRecord::Update { id, .. } => *id,
        }
    }

    /// Revision this record commits
    pub fn revision(&self) -> Revision {
        match self {
            WalRecord::Insert { revision, .. } | WalRecord::Update { revision, .. } => *revision,
        }
    }

    /// Check if this record creates a document
    pub fn is_insert(&self) -> bool {
        matches!(self, WalRecord::Insert { .. })
    }
}

/// Append handle on a journal file
pub struct Wal {
    path: PathBuf,
    writer: BufWriter<File>,
    mode: DurabilityMode,
    /// Bytes in the file, including buffered ones
    len: u64,
    /// Appends since the last fsync
    unsynced: usize,
}

impl Wal {
    /// Open a journal for appending, positioned at `len`
    ///
    /// `len` is the length of the valid prefix established by recovery.
    pub fn open(path: impl AsRef<Path>, mode: DurabilityMode, len: u64) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            mode,
            len,
            unsynced: 0,
        })
    }

    /// Append a record and apply the durability mode
    ///
    /// When this returns `Ok` the record has reached the OS, and under
    /// [`DurabilityMode::Strict`] the disk.
    pub fn append(&mut self, record: &WalRecord) -> StoreResult<()> {
        let frame =
            encode_record(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.writer.write_all(&frame)?;
        self.writer.flush()?;
        self.len += frame.len() as u64;
        self.unsynced += 1;

        match self.mode {
            DurabilityMode::Strict => self.sync()?,
            DurabilityMode::Batched { batch_size } if self.unsynced >= batch_size.max(1) => {
                self.sync()?
            }
            _ => {}
        }
        Ok(())
    }

    /// Flush buffers and fsync
    pub fn sync(&mut self) -> StoreResult<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        if self.unsynced > 0 {
            debug!(path = %self.path.display(), records = self.unsynced, "journal synced");
        }
        self.unsynced = 0;
        Ok(())
    }

    /// Journal length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Check if nothing has been journaled
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Journal file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durability mode in effect
    pub fn mode(&self) -> DurabilityMode {
        self.mode
    }
}
