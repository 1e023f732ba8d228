//! Convenient imports for RevisionDB.
//!
//! ```ignore
//! use revisiondb::prelude::*;
//!
//! let db = RevisionDb::open("./my-db")?;
//! let doc = db.documents.add(DocumentId::new(), json!({"owner": "ada"}))?;
//! ```

// Main entry point
pub use crate::database::{RevisionDb, RevisionDbBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Primitives
pub use crate::primitives::Documents;

// Core types
pub use crate::types::{Document, DocumentId, DurabilityMode, Revision, RetryPolicy};

// Re-export serde_json for convenience
pub use serde_json::json;
