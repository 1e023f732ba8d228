//! Repository error types
//!
//! Callers branch on the variant:
//! - [`RepositoryError::Conflict`]: someone else won the race; re-read and retry
//!   or give up
//! - [`RepositoryError::Backend`]: the backend did not answer; the outcome of a
//!   write is unknown
//!
//! These two are never merged.

use revisiondb_core::{DocumentId, Revision, StoreError};
use thiserror::Error;

/// Errors returned by [`crate::DocumentRepository`]
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The proposed revision did not exceed the stored one
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
    #[error("document {id} not found")]
    NotFound {
        /// Requested id
        id: DocumentId,
    },

    /// A document already exists under this id
    #[error("document {id} already exists")]
    AlreadyExists {
        /// Occupied id
        id: DocumentId,
    },

    /// Backend failure, propagated unchanged
    #[error("backend error: {0}")]
    Backend(#[from] StoreError),

    /// Payload could not be encoded or decoded
    #[error("payload serialization error: {0}")]
    Serialization(String),

    /// The snapshot revision cannot be advanced
    #[error("revision of document {id} cannot be advanced")]
    RevisionOverflow {
        /// Document at the maximum revision
        id: DocumentId,
    },

    /// Configuration rejected
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RepositoryError {
    /// Check if this is a conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::Conflict { .. })
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }

    /// Check if the backend failed
    pub fn is_backend(&self) -> bool {
        matches!(self, RepositoryError::Backend(_))
    }

    /// Document the error refers to, if any
    pub fn document_id(&self) -> Option<DocumentId> {
        match self {
            RepositoryError::Conflict { id, .. }
            | RepositoryError::NotFound { id }
            | RepositoryError::AlreadyExists { id }
            | RepositoryError::RevisionOverflow { id } => Some(*id),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        RepositoryError::Serialization(e.to_string())
    }
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;
