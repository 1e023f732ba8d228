//! Document API Test Suite
//!
//! End-to-end tests through the public `RevisionDb` API and, where a test
//! needs to control the backend, through `DocumentRepository` directly.
//!
//! ## Modules
//!
//! - `basic_ops`: add, get, find, exists, seed
//! - `scenarios`: the reference conflict scenarios
//! - `concurrency`: racing writers on one document and on many
//! - `durability`: reopen, torn and zero-filled journal tails, oversized writes
//! - `faults`: backend failures never surface as conflicts
//! - `properties`: revision invariants over generated update sequences
//! - `sessions`: handle close and session release
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test documents
//! cargo test --test documents concurrency::
//! ```

use revisiondb::prelude::*;
use revisiondb_engine::{DocumentRepository, StoreHandle};
use revisiondb_storage::{FaultyStore, ShardedStore};
use serde::{Deserialize, Serialize};
use std::sync::Once;

pub mod basic_ops;
pub mod concurrency;
pub mod durability;
pub mod faults;
pub mod sessions;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

static TRACING: Once = Once::new();

/// Route library logs through the test harness
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Create an ephemeral database
pub fn ephemeral_db() -> RevisionDb {
    init_tracing();
    RevisionDb::ephemeral().expect("Failed to create ephemeral database")
}

/// Repository over a fault-injecting in-memory store
pub fn faulty_repo() -> DocumentRepository<FaultyStore<ShardedStore>> {
    init_tracing();
    DocumentRepository::new(StoreHandle::new(FaultyStore::new(ShardedStore::new())))
}

/// Payload used across the suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub tags: Vec<String>,
}

/// A note with no tags
pub fn note(text: &str) -> Note {
    Note {
        text: text.to_string(),
        tags: Vec::new(),
    }
}

/// Shorthand for a non-zero revision
pub fn rev(n: u64) -> Revision {
    Revision::new(n).expect("revision must be non-zero")
}
