//! Public types for the RevisionDB API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// Identity and revision
pub use revisiondb_core::DocumentId;
pub use revisiondb_core::Revision;
pub use revisiondb_core::Timestamp;

// Document snapshot
pub use revisiondb_core::Document;

// Configuration
pub use revisiondb_durability::DurabilityMode;
pub use revisiondb_engine::{RepositoryConfig, RetryPolicy, StorageConfig};

// Statistics
pub use revisiondb_engine::RepositoryMetrics;
