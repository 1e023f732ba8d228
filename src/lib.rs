//! # RevisionDB
//!
//! Embedded document store with optimistic concurrency control.
//!
//! Every document carries a revision. An update proposes the revision it
//! read plus one, and the store accepts it only if nothing newer has been
//! committed in between. Concurrent writers from the same snapshot: exactly
//! one wins, the others get [`Error::Conflict`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use revisiondb::prelude::*;
//!
//! let db = RevisionDb::open("./my-db")?;
//! let id = DocumentId::new();
//!
//! let mut doc = db.documents.add(id, json!({"name": "Alice"}))?;
//! doc.payload["name"] = json!("Alicia");
//! db.documents.update(&mut doc)?;
//!
//! let stale: Document<serde_json::Value> = db.documents.get(id)?;
//! // ... someone else updates ...
//! match db.documents.update(&mut stale.clone()) {
//!     Err(e) if e.is_conflict() => { /* re-read and decide */ }
//!     other => { other?; }
//! }
//!
//! db.close()?;
//! ```
//!
//! ## Durability
//!
//! - `no_durability()` / [`RevisionDb::ephemeral`]: in memory only
//! - `batched(n)` (default): journaled, fsync every `n` writes
//! - `strict()`: journaled, fsync before each acknowledgement

#![warn(missing_docs)]

mod database;
mod error;
mod primitives;
mod types;

pub mod prelude;

// Re-export main entry points
pub use database::{DatabaseMetrics, RevisionDb, RevisionDbBuilder};
pub use error::{Error, Result};

// Re-export primitives
pub use primitives::Documents;

// Re-export types
pub use types::*;
