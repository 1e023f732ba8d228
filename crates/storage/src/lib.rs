//! Storage layer for RevisionDB
//!
//! This crate implements in-memory backends for the [`DocumentStore`]
//! contract:
//! - ShardedStore: DashMap-based storage with per-shard atomic CAS
//! - FaultyStore: wrapper injecting transport failures for testing
//!
//! [`DocumentStore`]: revisiondb_core::DocumentStore

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fault;
pub mod sharded;

pub use fault::{FaultPoint, FaultyStore};
pub use sharded::ShardedStore;
