//! Backend error types
//!
//! [`StoreError`] covers failures where the backend could not give an answer:
//! transport loss, I/O, corruption, a closed handle. Expected protocol
//! outcomes (conflict, already exists, missing) are NOT errors at this layer;
//! they are returned as [`crate::traits::CasOutcome`] and
//! [`crate::traits::InsertOutcome`] values so they can never be confused with a
//! backend fault.

use thiserror::Error;

/// Failure of a backend call
///
/// When a write returns a `StoreError` the caller does not know whether the
/// write landed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or the acknowledgement was lost
    #[error("backend unavailable: {message}")]
    Unavailable {
        /// What failed
        message: String,
    },

    /// I/O error from a file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted state failed validation
    #[error("corruption: {message}")]
    Corruption {
        /// What was found to be corrupt
        message: String,
    },

    /// Record encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The store handle has been closed
    #[error("store is closed")]
    Closed,
}

impl StoreError {
    /// Shorthand for [`StoreError::Unavailable`]
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }

    /// Shorthand for [`StoreError::Corruption`]
    pub fn corruption(message: impl Into<String>) -> Self {
        StoreError::Corruption {
            message: message.into(),
        }
    }
}

/// Result type for backend operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
