//! Core types and traits for RevisionDB
//!
//! This crate defines the shared vocabulary of the workspace:
//! - Identifiers and revisions ([`DocumentId`], [`Revision`])
//! - Document snapshots and stored records ([`Document`], [`StoredDocument`])
//! - The backend contract ([`DocumentStore`])
//! - Backend errors ([`StoreError`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod traits;
pub mod types;

pub use document::{Document, Payload, StoredDocument};
pub use error::{StoreError, StoreResult};
pub use traits::{CasOutcome, DocumentStore, InsertOutcome};
pub use types::{now_millis, DocumentId, Revision, Timestamp, ZeroRevision};
