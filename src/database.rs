//! Main database entry point for RevisionDB.
//!
//! This module provides the `RevisionDb` struct, the primary entry point for
//! all database operations.

use crate::error::{Error, Result};
use crate::primitives::Documents;
use crate::types::{DurabilityMode, RepositoryConfig, RepositoryMetrics, RetryPolicy, StorageConfig};
use revisiondb_core::DocumentStore;
use revisiondb_durability::JournaledStore;
use revisiondb_engine::DocumentRepository;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// The RevisionDB database.
///
/// Create a database using [`RevisionDb::open`], [`RevisionDb::ephemeral`] or
/// [`RevisionDb::builder`].
///
/// # Example
///
/// ```ignore
/// use revisiondb::prelude::*;
///
/// let db = RevisionDb::open("./my-db")?;
/// let mut doc = db.documents.add(DocumentId::new(), json!({"name": "Alice"}))?;
/// doc.payload["name"] = json!("Alicia");
/// db.documents.update(&mut doc)?;
/// db.close()?;
/// ```
pub struct RevisionDb {
    inner: Arc<DocumentRepository<JournaledStore>>,

    /// Document operations
    pub documents: Documents,
}

impl RevisionDb {
    /// Open a database at the given path.
    ///
    /// Uses default settings (batched durability mode).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open()
    }

    /// Create an ephemeral database with no disk I/O.
    ///
    /// No files, no journal, nothing survives a drop.
    ///
    /// | Method | Disk Files | Recovery |
    /// |--------|------------|----------|
    /// | `RevisionDb::ephemeral()` | None | No |
    /// | `RevisionDb::open_temp()` | Temp dir | Yes |
    /// | `RevisionDb::open(path)` | User dir | Yes |
    pub fn ephemeral() -> Result<Self> {
        Self::builder().no_durability().open()
    }

    /// Open a database in a fresh temporary directory.
    pub fn open_temp() -> Result<Self> {
        Self::builder().open_temp()
    }

    /// Open a database from a configuration.
    pub fn from_config(config: &RepositoryConfig) -> Result<Self> {
        let repo = DocumentRepository::from_config(config)?;
        Ok(Self::from_repository(repo))
    }

    /// Create a builder for database configuration.
    ///
    /// ```ignore
    /// let db = RevisionDb::builder()
    ///     .path("./my-db")
    ///     .strict()
    ///     .open()?;
    /// ```
    pub fn builder() -> RevisionDbBuilder {
        RevisionDbBuilder::new()
    }

    /// Force all acknowledged writes to disk.
    ///
    /// In batched mode, writes are synced in groups. Call `flush()` to make
    /// everything so far durable.
    pub fn flush(&self) -> Result<()> {
        self.inner.handle().store().flush().map_err(Error::from)
    }

    /// Gracefully close the database.
    ///
    /// Waits for operations already running on other threads, then flushes
    /// pending writes. Later operations fail with a storage error. Closing
    /// twice is a no-op.
    pub fn close(&self) -> Result<()> {
        self.inner.close().map_err(Into::into)
    }

    /// Get the database directory, if it has one.
    pub fn path(&self) -> Option<&Path> {
        self.inner.handle().store().dir()
    }

    /// Get the current durability mode.
    pub fn durability_mode(&self) -> DurabilityMode {
        self.inner.handle().store().durability_mode()
    }

    /// Check if this is an ephemeral (no-disk) database.
    pub fn is_ephemeral(&self) -> bool {
        self.inner.handle().store().is_ephemeral()
    }

    /// Check if the database still accepts operations.
    pub fn is_open(&self) -> bool {
        self.inner.handle().is_open()
    }

    /// Get database metrics.
    pub fn metrics(&self) -> DatabaseMetrics {
        let handle = self.inner.handle();
        DatabaseMetrics {
            documents: handle.store().len(),
            commits: handle.store().commits(),
            active_sessions: handle.active_sessions(),
            repository: self.inner.metrics(),
        }
    }

    fn from_repository(repo: DocumentRepository<JournaledStore>) -> Self {
        let inner = Arc::new(repo);
        Self {
            documents: Documents::new(Arc::clone(&inner)),
            inner,
        }
    }
}

/// Database metrics.
#[derive(Debug, Clone)]
pub struct DatabaseMetrics {
    /// Documents currently stored
    pub documents: usize,
    /// Writes applied to the store, including journal replay
    pub commits: u64,
    /// Sessions in flight
    pub active_sessions: usize,
    /// Operation counters since open
    pub repository: RepositoryMetrics,
}

/// Builder for database configuration.
///
/// # Example
///
/// ```ignore
/// // Production: disk-backed, fsync per commit
/// let db = RevisionDb::builder()
///     .path("./my-db")
///     .strict()
///     .open()?;
///
/// // Integration testing: temp directory, journal synced in batches
/// let db = RevisionDb::builder()
///     .batched(16)
///     .open_temp()?;
///
/// // Unit testing: truly ephemeral (no disk at all)
/// let db = RevisionDb::ephemeral()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RevisionDbBuilder {
    config: RepositoryConfig,
}

impl RevisionDbBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database directory path.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.storage.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Keep no journal. Nothing is written to disk and nothing survives a
    /// drop, even if a path is set.
    pub fn no_durability(mut self) -> Self {
        self.config.storage.durability = DurabilityMode::None;
        self
    }

    /// Journal every write, fsync once per `batch_size` writes (default mode).
    pub fn batched(mut self, batch_size: usize) -> Self {
        self.config.storage.durability = DurabilityMode::Batched { batch_size };
        self
    }

    /// Journal every write and fsync before acknowledging it.
    pub fn strict(mut self) -> Self {
        self.config.storage.durability = DurabilityMode::Strict;
        self
    }

    /// Expected number of documents.
    pub fn shard_capacity(mut self, capacity: usize) -> Self {
        self.config.storage.shard_capacity = capacity;
        self
    }

    /// Retry settings for `update_with`.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Open the database.
    ///
    /// A durable mode needs a path; use [`RevisionDbBuilder::open_temp`] or
    /// [`RevisionDbBuilder::no_durability`] otherwise.
    pub fn open(self) -> Result<RevisionDb> {
        let StorageConfig {
            path, durability, ..
        } = &self.config.storage;
        if path.is_none() && durability.requires_journal() {
            return Err(Error::InvalidConfig(format!(
                "{:?} durability needs a path; set one or use open_temp()",
                durability
            )));
        }
        RevisionDb::from_config(&self.config)
    }

    /// Open a database in a fresh temporary directory.
    pub fn open_temp(mut self) -> Result<RevisionDb> {
        let dir = temp_dir();
        info!(dir = %dir.display(), "opening temporary database");
        self.config.storage.path = Some(dir);
        self.open()
    }
}

fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("revisiondb-{}", uuid::Uuid::new_v4()))
}
