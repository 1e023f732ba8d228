//! Fault injection for backend calls
//!
//! [`FaultyStore`] wraps any [`DocumentStore`] and turns selected calls into
//! [`StoreError::Unavailable`]. Two failure points are modelled:
//!
//! - [`FaultPoint::BeforeWrite`]: the request never reaches the backend, so
//!   nothing lands.
//! - [`FaultPoint::AfterWrite`]: the backend commits but the acknowledgement is
//!   lost. The caller sees a failure although the write is durable.
//!
//! The second case is why a transport failure must never be reported as a
//! conflict: the caller does not know who won.

use parking_lot::Mutex;
use rand::Rng;
use revisiondb_core::{
    CasOutcome, DocumentId, DocumentStore, InsertOutcome, Payload, Revision, StoreError,
    StoreResult, StoredDocument,
};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Where an injected failure happens relative to the backend write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// Fail before the backend sees the call
    BeforeWrite,
    /// Let the backend apply the call, then drop the response
    AfterWrite,
}

#[derive(Debug, Default)]
struct FaultPlan {
    /// Calls still to fail deterministically
    remaining: u32,
    point: Option<FaultPoint>,
    /// Probability of failing a write when no deterministic fault is armed
    write_loss_rate: f64,
    fail_reads: bool,
}

/// Wrapper that injects transport failures into another store
pub struct FaultyStore<S> {
    inner: S,
    plan: Mutex<FaultPlan>,
    injected: AtomicU64,
}

impl<S: DocumentStore> FaultyStore<S> {
    /// Wrap a store with no faults armed
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            plan: Mutex::new(FaultPlan::default()),
            injected: AtomicU64::new(0),
        }
    }

    /// Fail the next `count` write calls at `point`
    pub fn fail_next_writes(&self, count: u32, point: FaultPoint) {
        let mut plan = self.plan.lock();
        plan.remaining = count;
        plan.point = Some(point);
    }

    /// Drop the acknowledgement of each write with probability `rate`
    ///
    /// `rate` is clamped to `[0.0, 1.0]`.
    pub fn set_write_loss_rate(&self, rate: f64) {
        self.plan.lock().write_loss_rate = rate.clamp(0.0, 1.0);
    }

    /// Make reads fail until turned off again
    pub fn set_fail_reads(&self, fail: bool) {
        self.plan.lock().fail_reads = fail;
    }

    /// Disarm every fault
    pub fn heal(&self) {
        *self.plan.lock() = FaultPlan::default();
    }

    /// Number of failures injected so far
    pub fn injected(&self) -> u64 {
        self.injected.load(Ordering::Acquire)
    }

    /// Access the wrapped store, bypassing fault injection
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn take_write_fault(&self) -> Option<FaultPoint> {
        let mut plan = self.plan.lock();
        if plan.remaining > 0 {
            plan.remaining -= 1;
            return plan.point;
        }
        if plan.write_loss_rate > 0.0 && rand::thread_rng().gen_bool(plan.write_loss_rate) {
            return Some(FaultPoint::AfterWrite);
        }
        None
    }

    fn inject(&self, op: &'static str, id: &DocumentId, point: FaultPoint) -> StoreError {
        self.injected.fetch_add(1, Ordering::AcqRel);
        debug!(%id, op, ?point, "injecting backend failure");
        StoreError::unavailable(format!("simulated failure during {}", op))
    }

    fn faulted_write<T>(
        &self,
        op: &'static str,
        id: DocumentId,
        write: impl FnOnce(&S) -> StoreResult<T>,
    ) -> StoreResult<T> {
        match self.take_write_fault() {
            None => write(&self.inner),
            Some(FaultPoint::BeforeWrite) => Err(self.inject(op, &id, FaultPoint::BeforeWrite)),
            Some(FaultPoint::AfterWrite) => {
                write(&self.inner)?;
                Err(self.inject(op, &id, FaultPoint::AfterWrite))
            }
        }
    }
}

impl<S: DocumentStore> DocumentStore for FaultyStore<S> {
    fn get(&self, id: &DocumentId) -> StoreResult<Option<StoredDocument>> {
        if self.plan.lock().fail_reads {
            return Err(self.inject("get", id, FaultPoint::BeforeWrite));
        }
        self.inner.get(id)
    }

    fn insert_if_absent(
        &self,
        id: DocumentId,
        payload: Payload,
        revision: Revision,
    ) -> StoreResult<InsertOutcome> {
        self.faulted_write("insert", id, |inner| {
            inner.insert_if_absent(id, payload, revision)
        })
    }

    fn compare_and_swap(
        &self,
        id: DocumentId,
        payload: Payload,
        new_revision: Revision,
    ) -> StoreResult<CasOutcome> {
        self.faulted_write("compare_and_swap", id, |inner| {
            inner.compare_and_swap(id, payload, new_revision)
        })
    }

    fn flush(&self) -> StoreResult<()> {
        self.inner.flush()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
