//! Repository counters

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub adds: AtomicU64,
    pub reads: AtomicU64,
    pub updates_committed: AtomicU64,
    pub conflicts: AtomicU64,
    pub backend_failures: AtomicU64,
    pub retries: AtomicU64,
}

impl Counters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RepositoryMetrics {
        let updates_committed = self.updates_committed.load(Ordering::Relaxed);
        let conflicts = self.conflicts.load(Ordering::Relaxed);
        let attempted = updates_committed + conflicts;
        RepositoryMetrics {
            adds: self.adds.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            updates_committed,
            conflicts,
            backend_failures: self.backend_failures.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            conflict_rate: if attempted == 0 {
                0.0
            } else {
                conflicts as f64 / attempted as f64
            },
        }
    }
}

/// Point-in-time repository statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryMetrics {
    /// Documents created through `add` or `seed`
    pub adds: u64,
    /// Successful reads
    pub reads: u64,
    /// Updates that committed
    pub updates_committed: u64,
    /// Updates rejected by the revision check
    pub conflicts: u64,
    /// Calls that failed in the backend
    pub backend_failures: u64,
    /// Extra attempts made by `update_with`
    pub retries: u64,
    /// conflicts / (conflicts + committed updates)
    pub conflict_rate: f64,
}
