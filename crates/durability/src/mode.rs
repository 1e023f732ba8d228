//! Durability mode for journal writes.
//!
//! Defines when acknowledged writes are fsynced to disk.

use serde::{Deserialize, Serialize};

/// Durability mode for journal writes.
///
/// # Mode Comparison
///
/// | Mode | Journal | fsync | Data Loss Window |
/// |------|---------|-------|------------------|
/// | None | no | never | everything |
/// | Batched | yes | every `batch_size` writes, and on flush | up to `batch_size - 1` writes |
/// | Strict | yes | every write | none |
///
/// In TOML:
///
/// ```toml
/// durability = "strict"
/// # or
/// durability = { batched = { batch_size = 256 } }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurabilityMode {
    /// No journal. All data is lost when the store is dropped.
    None,

    /// fsync after every write.
    Strict,

    /// fsync every `batch_size` writes.
    ///
    /// Writes are still handed to the OS immediately, so a process crash
    /// loses nothing; only a machine crash can lose the unsynced tail.
    Batched {
        /// Maximum writes between fsyncs
        batch_size: usize,
    },
}

impl DurabilityMode {
    /// Check if this mode keeps a journal.
    pub fn requires_journal(&self) -> bool {
        !matches!(self, DurabilityMode::None)
    }

    /// Check if this mode fsyncs on every write.
    pub fn requires_immediate_fsync(&self) -> bool {
        matches!(self, DurabilityMode::Strict)
    }

    /// Batched mode with the default batch size of 64 writes.
    pub fn batched_default() -> Self {
        DurabilityMode::Batched { batch_size: 64 }
    }

    /// Human-readable description of the mode.
    pub fn description(&self) -> &'static str {
        match self {
            DurabilityMode::None => "No durability (all data lost on drop)",
            DurabilityMode::Strict => "fsync every write (safest, slowest)",
            DurabilityMode::Batched { .. } => "Batched fsync (balanced speed/safety)",
        }
    }
}

impl Default for DurabilityMode {
    fn default() -> Self {
        Self::batched_default()
    }
}
