//! Revision policy
//!
//! Pure functions deciding which revision a write proposes and whether the
//! store may accept it. Backends call [`RevisionPolicy::validate_against_store`]
//! inside their atomic conditional-write step.
//!
//! The acceptance rule is `stored < proposed`, not `stored + 1 == proposed`.
//! A proposal further ahead than the immediate successor is accepted; a
//! proposal that does not advance the stored history never is.

use crate::validation::{RevisionConflict, ValidationResult};
use revisiondb_core::Revision;
use thiserror::Error;

/// The snapshot revision has no successor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("revision {0} cannot be advanced")]
pub struct RevisionOverflow(pub Revision);

/// Stateless revision rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevisionPolicy;

impl RevisionPolicy {
    /// Create the policy
    pub const fn new() -> Self {
        RevisionPolicy
    }

    /// Revision a writer holding `snapshot` proposes to commit
    ///
    /// # Examples
    ///
    /// ```
    /// use revisiondb_concurrency::RevisionPolicy;
    /// use revisiondb_core::Revision;
    ///
    /// let next = RevisionPolicy::new().next_revision(Revision::INITIAL).unwrap();
    /// assert_eq!(next.get(), 2);
    /// ```
    pub fn next_revision(&self, snapshot: Revision) -> Result<Revision, RevisionOverflow> {
        snapshot.next().ok_or(RevisionOverflow(snapshot))
    }

    /// Decide whether `proposed` may replace `stored`
    ///
    /// Accept iff `stored < proposed`.
    pub fn validate_against_store(&self, proposed: Revision, stored: Revision) -> ValidationResult {
        if stored < proposed {
            ValidationResult::Accept
        } else {
            ValidationResult::Conflict(RevisionConflict { proposed, stored })
        }
    }

    /// Decide whether a document may be created
    ///
    /// Creation is only valid when nothing is stored under the id.
    pub fn validate_insert(&self, existing: Option<Revision>) -> Result<(), Revision> {
        match existing {
            None => Ok(()),
            Some(stored) => Err(stored),
        }
    }
}
