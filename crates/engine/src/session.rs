//! Store handle and scoped sessions
//!
//! A [`StoreHandle`] is the explicit backend reference a repository is built
//! with. Every operation runs inside a [`Session`], acquired from the handle
//! and released when it goes out of scope, on success and failure alike.
//!
//! Closing the handle refuses new sessions with [`StoreError::Closed`], waits
//! for sessions already running to finish, then flushes the backend once. A
//! thread must not close a handle while it still holds one of its sessions.

use parking_lot::{Condvar, Mutex};
use revisiondb_core::{DocumentStore, StoreError, StoreResult};
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

struct HandleInner<S> {
    store: S,
    open: AtomicBool,
    active: AtomicUsize,
    /// Paired with `idle`; guards nothing but the wakeup
    drain: Mutex<()>,
    idle: Condvar,
}

impl<S> HandleInner<S> {
    fn release(&self) {
        if self.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            let _guard = self.drain.lock();
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let mut guard = self.drain.lock();
        while self.active.load(Ordering::Acquire) > 0 {
            self.idle.wait(&mut guard);
        }
    }
}

/// Shared, closable reference to a backend
pub struct StoreHandle<S> {
    inner: Arc<HandleInner<S>>,
}

impl<S> Clone for StoreHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DocumentStore> StoreHandle<S> {
    /// Take ownership of an open backend
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                store,
                open: AtomicBool::new(true),
                active: AtomicUsize::new(0),
                drain: Mutex::new(()),
                idle: Condvar::new(),
            }),
        }
    }

    /// Start a session
    ///
    /// # Errors
    ///
    /// [`StoreError::Closed`] once [`StoreHandle::close`] has been called.
    pub fn session(&self) -> StoreResult<Session<'_, S>> {
        // Count first so close() never misses a session that passed the check.
        self.inner.active.fetch_add(1, Ordering::AcqRel);
        if !self.inner.open.load(Ordering::Acquire) {
            self.inner.release();
            return Err(StoreError::Closed);
        }
        Ok(Session { handle: self })
    }

    /// Refuse new sessions, wait for running ones, then flush the backend
    ///
    /// Writes acknowledged by sessions that were in flight when `close` was
    /// called are covered by the flush. Only the first call flushes; later
    /// calls return `Ok(())` without waiting.
    ///
    /// Blocks forever if the calling thread itself holds a session.
    pub fn close(&self) -> StoreResult<()> {
        if !self.inner.open.swap(false, Ordering::AcqRel) {
            debug!("store handle already closed");
            return Ok(());
        }
        let in_flight = self.active_sessions();
        if in_flight > 0 {
            debug!(in_flight, "waiting for sessions to finish");
            self.inner.wait_idle();
        }
        self.inner.store.flush()?;
        info!(in_flight, documents = self.inner.store.len(), "store handle closed");
        Ok(())
    }

    /// Check if new sessions are accepted
    pub fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::Acquire)
    }

    /// Sessions currently alive
    pub fn active_sessions(&self) -> usize {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Backend, bypassing session accounting
    pub fn store(&self) -> &S {
        &self.inner.store
    }
}

/// Scoped access to the backend
///
/// Dereferences to the store. Dropping the session releases it.
pub struct Session<'a, S> {
    handle: &'a StoreHandle<S>,
}

impl<S> Deref for Session<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.handle.inner.store
    }
}

impl<S> Drop for Session<'_, S> {
    fn drop(&mut self) {
        self.handle.inner.release();
    }
}
