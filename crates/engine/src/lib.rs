//! Repository engine for RevisionDB
//!
//! This crate is the caller-facing orchestration layer:
//! - DocumentRepository: typed add/get/update with optimistic concurrency
//! - StoreHandle / Session: explicit, closable backend access
//! - RepositoryConfig: TOML configuration of backend and retry behaviour
//! - RepositoryError: conflict, not-found and backend failures kept apart
//! - RepositoryMetrics: operation counters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
mod metrics;
pub mod repository;
pub mod session;

pub use config::{RepositoryConfig, RetryPolicy, StorageConfig};
pub use error::{RepositoryError, Result};
pub use metrics::RepositoryMetrics;
pub use repository::DocumentRepository;
pub use session::{Session, StoreHandle};
