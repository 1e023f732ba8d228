//! Core types for the document store
//!
//! This module defines the fundamental types used throughout the system:
//! - [`DocumentId`]: Unique identifier for a document
//! - [`Revision`]: Strictly positive per-document revision counter

use serde::{Deserialize, Deserializer, Serialize};
use std::num::NonZeroU64;
use uuid::Uuid;

/// Unique identifier for a document
///
/// DocumentId is the unit of isolation: every read, insert and conditional
/// write targets exactly one id, and writes to different ids never interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a new random DocumentId using UUID v4
    ///
    /// # Examples
    ///
    /// ```
    /// use revisiondb_core::DocumentId;
    ///
    /// let id1 = DocumentId::new();
    /// let id2 = DocumentId::new();
    /// assert_ne!(id1, id2);
    /// ```
    pub fn new() -> Self {
        DocumentId(Uuid::new_v4())
    }

    /// Create DocumentId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        DocumentId(Uuid::from_bytes(bytes))
    }

    /// Create DocumentId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        DocumentId(uuid)
    }

    /// Get raw bytes representation
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(DocumentId)
    }
}

impl From<Uuid> for DocumentId {
    fn from(uuid: Uuid) -> Self {
        DocumentId(uuid)
    }
}

/// Per-document revision counter
///
/// Revisions are strictly positive. A document is created at
/// [`Revision::INITIAL`] and every committed update advances it by one.
/// Zero is unrepresentable, including through deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Revision(NonZeroU64);

impl Revision {
    /// The revision a document has right after `add`
    pub const INITIAL: Revision = match NonZeroU64::new(1) {
        Some(n) => Revision(n),
        None => unreachable!(),
    };

    /// The largest representable revision
    pub const MAX: Revision = Revision(NonZeroU64::MAX);

    /// Create a revision, returning `None` for zero
    ///
    /// # Examples
    ///
    /// ```
    /// use revisiondb_core::Revision;
    ///
    /// assert_eq!(Revision::new(1), Some(Revision::INITIAL));
    /// assert_eq!(Revision::new(0), None);
    /// ```
    pub const fn new(value: u64) -> Option<Self> {
        match NonZeroU64::new(value) {
            Some(n) => Some(Revision(n)),
            None => None,
        }
    }

    /// Get the raw counter value
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// The immediate successor, or `None` on overflow
    #[inline]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Revision)
    }
}

impl Default for Revision {
    fn default() -> Self {
        Revision::INITIAL
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Revision> for u64 {
    fn from(revision: Revision) -> Self {
        revision.get()
    }
}

impl TryFrom<u64> for Revision {
    type Error = ZeroRevision;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Revision::new(value).ok_or(ZeroRevision)
    }
}

impl<'de> Deserialize<'de> for Revision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        Revision::new(raw).ok_or_else(|| serde::de::Error::custom("revision must be positive"))
    }
}

/// Error returned when converting zero into a [`Revision`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("revision must be positive")]
pub struct ZeroRevision;

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

/// Current wall-clock time as a [`Timestamp`]
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}
