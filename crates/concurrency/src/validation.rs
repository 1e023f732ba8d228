//! Write validation results
//!
//! Validation compares a proposed revision against what the store holds.
//! First committer wins: once any writer has advanced a document to revision
//! `n`, every proposal of `n` or lower is a conflict.

use revisiondb_core::Revision;

/// A rejected proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionConflict {
    /// Revision the writer tried to commit
    pub proposed: Revision,
    /// Revision already in the store
    pub stored: Revision,
}

impl RevisionConflict {
    /// Number of commits that landed after the writer's snapshot
    ///
    /// Always at least 1 for a real conflict.
    pub fn lag(&self) -> u64 {
        self.stored.get().saturating_sub(self.proposed.get() - 1)
    }
}

impl std::fmt::Display for RevisionConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "proposed revision {} does not exceed stored revision {}",
            self.proposed, self.stored
        )
    }
}

/// Result of validating a write against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    /// The write may commit
    Accept,
    /// The write must be rejected
    Conflict(RevisionConflict),
}

impl ValidationResult {
    /// Check if the write may proceed
    pub fn is_accept(&self) -> bool {
        matches!(self, ValidationResult::Accept)
    }

    /// Check if the write was rejected
    pub fn is_conflict(&self) -> bool {
        matches!(self, ValidationResult::Conflict(_))
    }

    /// The conflict, if any
    pub fn conflict(&self) -> Option<&RevisionConflict> {
        match self {
            ValidationResult::Conflict(c) => Some(c),
            ValidationResult::Accept => None,
        }
    }
}
