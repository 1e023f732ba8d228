//! Durability layer for RevisionDB
//!
//! This crate implements a journaled backend:
//! - WAL: append-only journal of committed writes
//! - Frame encoding/decoding with CRC32 checksums
//! - Durability modes: None, Batched, Strict
//! - Recovery: replay the journal, truncate a torn tail
//! - JournaledStore: a DocumentStore that journals before applying

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoding;
pub mod journaled;
pub mod mode;
pub mod recovery;
pub mod wal;

pub use encoding::{decode_record, encode_record, DecodeError, EncodeError};
pub use journaled::JournaledStore;
pub use mode::DurabilityMode;
pub use recovery::{recover, RecoveryResult};
pub use wal::{Wal, WalRecord, WAL_FILENAME};
