//! Concurrency layer for RevisionDB
//!
//! This crate implements the optimistic concurrency rules:
//! - RevisionPolicy: next-revision computation and write validation
//! - ValidationResult: accept / conflict outcome of a validation
//! - First-committer-wins: a proposal that does not advance the stored
//!   revision is rejected

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod policy;
pub mod validation;

pub use policy::{RevisionOverflow, RevisionPolicy};
pub use validation::{RevisionConflict, ValidationResult};
