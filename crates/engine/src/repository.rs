//! Document repository
//!
//! Typed create/read/update over any [`DocumentStore`], enforcing optimistic
//! concurrency with per-document revisions.
//!
//! ## Update Protocol
//!
//! ```text
//! 1. proposed = snapshot.revision + 1
//! 2. compare_and_swap(id, payload, proposed)   (atomic in the backend)
//! 3. Swapped   -> snapshot.revision = proposed
//!    Conflict  -> RepositoryError::Conflict, snapshot untouched
//!    Missing   -> RepositoryError::NotFound
//!    Err(e)    -> RepositoryError::Backend(e)
//! ```
//!
//! The repository holds no locks and no cached state. All serialization of
//! competing writers happens inside the backend's conditional write, so any
//! number of repositories may share one backend.

use crate::config::{RepositoryConfig, RetryPolicy};
use crate::error::{RepositoryError, Result};
use crate::metrics::{Counters, RepositoryMetrics};
use crate::session::{Session, StoreHandle};
use revisiondb_concurrency::RevisionPolicy;
use revisiondb_core::{
    CasOutcome, Document, DocumentId, DocumentStore, InsertOutcome, Payload, Revision,
    StoreResult,
};
use revisiondb_durability::JournaledStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Optimistic-concurrency document repository
pub struct DocumentRepository<S: DocumentStore> {
    handle: StoreHandle<S>,
    policy: RevisionPolicy,
    retry: RetryPolicy,
    counters: Counters,
}

impl DocumentRepository<JournaledStore> {
    /// Open the backend described by `config` and wrap it
    pub fn from_config(config: &RepositoryConfig) -> Result<Self> {
        config.validate()?;
        let store = config.storage.open()?;
        Ok(DocumentRepository::new(StoreHandle::new(store)).with_retry_policy(config.retry))
    }
}

impl<S: DocumentStore> DocumentRepository<S> {
    /// Build a repository over an explicit store handle
    pub fn new(handle: StoreHandle<S>) -> Self {
        Self {
            handle,
            policy: RevisionPolicy::new(),
            retry: RetryPolicy::default(),
            counters: Counters::default(),
        }
    }

    /// Replace the policy used by [`DocumentRepository::update_with`]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Store handle this repository operates on
    pub fn handle(&self) -> &StoreHandle<S> {
        &self.handle
    }

    /// Retry policy for `update_with`
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Create a document at [`Revision::INITIAL`]
    ///
    /// # Errors
    ///
    /// [`RepositoryError::AlreadyExists`] if the id is taken.
    pub fn add<P: Serialize>(&self, id: DocumentId, payload: P) -> Result<Document<P>> {
        self.create(id, &payload, Revision::INITIAL)?;
        debug!(%id, "document added");
        Ok(Document::new(id, payload))
    }

    /// Create a document at a caller-chosen revision
    ///
    /// For importing documents whose history started elsewhere. Ordinary
    /// creation goes through [`DocumentRepository::add`].
    pub fn seed<P: Serialize>(
        &self,
        id: DocumentId,
        payload: P,
        revision: Revision,
    ) -> Result<Document<P>> {
        self.create(id, &payload, revision)?;
        info!(%id, revision = revision.get(), "document seeded");
        Ok(Document::with_revision(id, payload, revision))
    }

    /// Read the current snapshot
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] if no document exists under `id`.
    pub fn get<P: DeserializeOwned>(&self, id: DocumentId) -> Result<Document<P>> {
        self.find(id)?.ok_or(RepositoryError::NotFound { id })
    }

    /// Read the current snapshot, if any
    pub fn find<P: DeserializeOwned>(&self, id: DocumentId) -> Result<Option<Document<P>>> {
        let session = self.session()?;
        let Some(stored) = self.backend(session.get(&id))? else {
            return Ok(None);
        };
        let payload = serde_json::from_slice(stored.payload.as_bytes())?;
        Counters::bump(&self.counters.reads);
        Ok(Some(Document::with_revision(id, payload, stored.revision)))
    }

    /// Check whether a document exists
    pub fn exists(&self, id: DocumentId) -> Result<bool> {
        let session = self.session()?;
        Ok(self.backend(session.get(&id))?.is_some())
    }

    /// Commit the snapshot's payload at `revision + 1`
    ///
    /// On success the snapshot's revision is advanced and the new revision
    /// returned. On any error the snapshot is left exactly as it was.
    ///
    /// This never retries. A [`RepositoryError::Conflict`] means another
    /// writer committed first; re-read with [`DocumentRepository::get`] to
    /// continue, or use [`DocumentRepository::update_with`].
    pub fn update<P: Serialize>(&self, document: &mut Document<P>) -> Result<Revision> {
        let id = document.id;
        let proposed = self
            .policy
            .next_revision(document.revision)
            .map_err(|_| RepositoryError::RevisionOverflow { id })?;
        let payload = encode(&document.payload)?;

        let session = self.session()?;
        match self.backend(session.compare_and_swap(id, payload, proposed))? {
            CasOutcome::Swapped => {
                document.revision = proposed;
                Counters::bump(&self.counters.updates_committed);
                debug!(%id, revision = proposed.get(), "document updated");
                Ok(proposed)
            }
            CasOutcome::Conflict { stored } => {
                Counters::bump(&self.counters.conflicts);
                debug!(
                    %id,
                    proposed = proposed.get(),
                    stored = stored.get(),
                    "update rejected by revision check"
                );
                Err(RepositoryError::Conflict {
                    id,
                    proposed,
                    stored,
                })
            }
            CasOutcome::Missing => Err(RepositoryError::NotFound { id }),
        }
    }

    /// Read, mutate and update, retrying on conflict
    ///
    /// Each attempt reads a fresh snapshot, applies `mutate` to its payload
    /// and calls [`DocumentRepository::update`]. Only
    /// [`RepositoryError::Conflict`] triggers another attempt, after a capped
    /// exponential backoff. When attempts run out the last conflict is
    /// returned.
    ///
    /// `mutate` may run more than once and must only depend on the payload
    /// it is given.
    pub fn update_with<P, F>(&self, id: DocumentId, mut mutate: F) -> Result<Document<P>>
    where
        P: Serialize + DeserializeOwned,
        F: FnMut(&mut P),
    {
        let mut attempt = 1;
        loop {
            let mut document: Document<P> = self.get(id)?;
            mutate(&mut document.payload);
            match self.update(&mut document) {
                Ok(_) => return Ok(document),
                Err(e) if e.is_conflict() && attempt < self.retry.max_attempts => {
                    let backoff = self.retry.backoff(attempt);
                    warn!(
                        %id,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "conflict, retrying update"
                    );
                    Counters::bump(&self.counters.retries);
                    std::thread::sleep(backoff);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Number of stored documents
    pub fn len(&self) -> Result<usize> {
        Ok(self.session()?.len())
    }

    /// Check if the backend holds no documents
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Counters since the repository was built
    pub fn metrics(&self) -> RepositoryMetrics {
        self.counters.snapshot()
    }

    /// Flush and close the underlying handle
    ///
    /// Every repository sharing the handle is closed with it.
    pub fn close(&self) -> Result<()> {
        self.handle.close()?;
        Ok(())
    }

    fn create<P: Serialize>(&self, id: DocumentId, payload: &P, revision: Revision) -> Result<()> {
        let payload = encode(payload)?;
        let session = self.session()?;
        match self.backend(session.insert_if_absent(id, payload, revision))? {
            InsertOutcome::Inserted => {
                Counters::bump(&self.counters.adds);
                Ok(())
            }
            InsertOutcome::AlreadyExists { stored } => {
                debug!(%id, stored = stored.get(), "insert rejected, id taken");
                Err(RepositoryError::AlreadyExists { id })
            }
        }
    }

    fn session(&self) -> Result<Session<'_, S>> {
        self.backend(self.handle.session())
    }

    fn backend<T>(&self, result: StoreResult<T>) -> Result<T> {
        result.map_err(|e| {
            Counters::bump(&self.counters.backend_failures);
            warn!(error = %e, "backend call failed");
            RepositoryError::Backend(e)
        })
    }
}

fn encode<P: Serialize>(payload: &P) -> Result<Payload> {
    Ok(Payload::from(serde_json::to_vec(payload)?))
}
