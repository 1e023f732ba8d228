//! Document types
//!
//! Two views of a document exist:
//! - [`StoredDocument`]: what a backend persists (opaque payload bytes)
//! - [`Document`]: a caller-held snapshot with a typed payload
//!
//! Snapshots are copies. They become stale the moment another writer commits.

use crate::types::{now_millis, DocumentId, Revision, Timestamp};
use serde::{Deserialize, Serialize};

/// Opaque payload bytes as seen by a backend
///
/// Backends never interpret the payload; encoding is the repository's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Wrap raw bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Payload(bytes.into())
    }

    /// Borrow the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take the raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if payload is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload(bytes.to_vec())
    }
}

/// A document as persisted by a backend
///
/// Payload and revision always change together; a backend never exposes one
/// without the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Encoded payload
    pub payload: Payload,
    /// Revision of this payload
    pub revision: Revision,
    /// Commit time of this revision (milliseconds since epoch)
    pub updated_at: Timestamp,
}

impl StoredDocument {
    /// Create a stored document stamped with the current time
    pub fn new(payload: Payload, revision: Revision) -> Self {
        Self {
            payload,
            revision,
            updated_at: now_millis(),
        }
    }
}

/// A caller-held snapshot of a document
///
/// `revision` is the revision this snapshot was read at. Passing the snapshot
/// to an update proposes `revision + 1`; on success the snapshot is advanced
/// in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document<P> {
    /// Document identifier
    pub id: DocumentId,
    /// Application payload
    pub payload: P,
    /// Revision this snapshot was observed at
    pub revision: Revision,
}

impl<P> Document<P> {
    /// Create a snapshot at [`Revision::INITIAL`]
    pub fn new(id: DocumentId, payload: P) -> Self {
        Self {
            id,
            payload,
            revision: Revision::INITIAL,
        }
    }

    /// Create a snapshot at an explicit revision
    pub fn with_revision(id: DocumentId, payload: P, revision: Revision) -> Self {
        Self {
            id,
            payload,
            revision,
        }
    }

    /// Map the payload, keeping id and revision
    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> Document<Q> {
        Document {
            id: self.id,
            payload: f(self.payload),
            revision: self.revision,
        }
    }
}
