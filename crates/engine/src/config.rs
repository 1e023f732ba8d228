//! Repository configuration
//!
//! Loaded from TOML or built in code:
//!
//! ```toml
//! [storage]
//! path = "./data"
//! durability = "strict"
//! shard_capacity = 1024
//!
//! [retry]
//! max_attempts = 5
//! base_backoff_ms = 1
//! max_backoff_ms = 50
//! ```
//!
//! Every field is optional. A missing `storage.path` yields an ephemeral store
//! regardless of `durability`.

use crate::error::{RepositoryError, Result};
use revisiondb_core::StoreResult;
use revisiondb_durability::{DurabilityMode, JournaledStore};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Backend settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Store directory; `None` means ephemeral
    pub path: Option<PathBuf>,
    /// Journal durability
    pub durability: DurabilityMode,
    /// Expected number of documents
    pub shard_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            durability: DurabilityMode::default(),
            shard_capacity: 0,
        }
    }
}

impl StorageConfig {
    /// Open the store these settings describe
    pub fn open(&self) -> StoreResult<JournaledStore> {
        match &self.path {
            Some(path) => {
                JournaledStore::open_with_capacity(path, self.durability, self.shard_capacity)
            }
            None => Ok(JournaledStore::ephemeral_with_capacity(self.shard_capacity)),
        }
    }
}

/// Settings for [`crate::DocumentRepository::update_with`]
///
/// Plain `update` never retries. This policy only applies when the caller
/// explicitly asks for a read-modify-write loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Backoff before the second attempt
    pub base_backoff_ms: u64,
    /// Backoff cap
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff_ms: 1,
            max_backoff_ms: 50,
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Backoff after failed attempt number `attempt` (1-based)
    ///
    /// Doubles from `base_backoff_ms`, capped at `max_backoff_ms`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let cap = self.max_backoff_ms.max(self.base_backoff_ms);
        let factor = 1u64
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u64::MAX);
        Duration::from_millis(self.base_backoff_ms.saturating_mul(factor).min(cap))
    }

    /// Reject unusable settings
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(RepositoryError::InvalidConfig(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.base_backoff_ms > self.max_backoff_ms {
            return Err(RepositoryError::InvalidConfig(format!(
                "retry.base_backoff_ms ({}) exceeds retry.max_backoff_ms ({})",
                self.base_backoff_ms, self.max_backoff_ms
            )));
        }
        Ok(())
    }
}

/// Complete repository configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Backend settings
    pub storage: StorageConfig,
    /// Read-modify-write retry settings
    pub retry: RetryPolicy,
}

impl RepositoryConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: RepositoryConfig =
            toml::from_str(s).map_err(|e| RepositoryError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            RepositoryError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject unusable settings
    pub fn validate(&self) -> Result<()> {
        self.retry.validate()
    }
}
