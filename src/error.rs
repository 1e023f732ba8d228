//! Unified error type for RevisionDB.
//!
//! Wraps the engine and backend errors in one stable enum. A conflict and a
//! backend failure never map to the same variant.

use revisiondb_core::{DocumentId, Revision, StoreError};
use revisiondb_engine::RepositoryError;
use thiserror::Error;

/// All RevisionDB errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Another writer committed first
    #[error("document {id} has already been updated by another writer (proposed revision {proposed}, stored {stored})")]
    Conflict {
        /// Conflicting document
        id: DocumentId,
        /// Revision the caller tried to commit
        proposed: Revision,
        /// Revision found in the store
        stored: Revision,
    },

    /// No document under this id
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    /// The id is already taken
    #[error("document already exists: {0}")]
    AlreadyExists(DocumentId),

    /// The document is at the highest representable revision
    #[error("revision overflow on document {0}")]
    RevisionOverflow(DocumentId),

    /// Backend failure; the outcome of a write is unknown
    #[error("storage error: {0}")]
    Storage(#[source] StoreError),

    /// Payload encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration rejected
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for RevisionDB operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is retryable.
    ///
    /// Only conflicts are: re-read and try again. A storage failure may
    /// already have committed, so blind retry is not safe.
    pub fn is_retryable(&self) -> bool {
        self.is_conflict()
    }

    /// Check if this is a conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if the backend failed.
    pub fn is_backend(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    /// Check if this is a serious/unrecoverable error.
    pub fn is_serious(&self) -> bool {
        matches!(self, Error::Storage(StoreError::Corruption { .. }))
    }
}

impl From<RepositoryError> for Error {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict {
                id,
                proposed,
                stored,
            } => Error::Conflict {
                id,
                proposed,
                stored,
            },
            RepositoryError::NotFound { id } => Error::NotFound(id),
            RepositoryError::AlreadyExists { id } => Error::AlreadyExists(id),
            RepositoryError::RevisionOverflow { id } => Error::RevisionOverflow(id),
            RepositoryError::Backend(e) => Error::Storage(e),
            RepositoryError::Serialization(msg) => Error::Serialization(msg),
            RepositoryError::InvalidConfig(msg) => Error::InvalidConfig(msg),
        }
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Storage(e)
    }
}
