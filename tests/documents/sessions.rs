//! Store handle lifecycle

use crate::*;
use revisiondb_core::StoreError;
use revisiondb_engine::RepositoryError;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_closed_database_rejects_operations() {
    let db = ephemeral_db();
    let id = DocumentId::new();
    let mut doc = db.documents.add(id, note("v1")).unwrap();

    db.close().unwrap();
    assert!(!db.is_open());

    let err = db.documents.update(&mut doc).unwrap_err();
    assert!(matches!(err, Error::Storage(StoreError::Closed)));
    assert!(!err.is_conflict());
    assert_eq!(doc.revision, rev(1));
    assert!(db.documents.get::<Note>(id).unwrap_err().is_backend());
}

#[test]
fn test_close_twice_is_noop() {
    let db = ephemeral_db();
    db.close().unwrap();
    db.close().unwrap();
}

#[test]
fn test_sessions_released_after_every_outcome() {
    let repo = faulty_repo();
    let id = DocumentId::new();

    let mut doc = repo.add(id, note("v1")).unwrap();
    let _ = repo.add(id, note("dup"));
    let _ = repo.get::<Note>(DocumentId::new());
    let _ = repo.get::<u64>(id);
    let mut stale = doc.clone();
    repo.update(&mut doc).unwrap();
    let _ = repo.update(&mut stale);
    repo.handle()
        .store()
        .fail_next_writes(1, revisiondb_storage::FaultPoint::AfterWrite);
    let _ = repo.update(&mut doc);

    assert_eq!(repo.handle().active_sessions(), 0);
}

#[test]
fn test_sessions_balance_under_contention() {
    let db = Arc::new(ephemeral_db());
    let id = DocumentId::new();
    db.documents.add(id, note("v1")).unwrap();
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..50 {
                    let mut doc: Document<Note> = db.documents.get(id).unwrap();
                    let _ = db.documents.update(&mut doc);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(db.metrics().active_sessions, 0);
}

#[test]
fn test_repositories_share_a_closed_handle() {
    init_tracing();
    let handle = StoreHandle::new(ShardedStore::new());
    let first = DocumentRepository::new(handle.clone());
    let second = DocumentRepository::new(handle);

    let id = DocumentId::new();
    first.add(id, note("v1")).unwrap();
    assert_eq!(second.get::<Note>(id).unwrap().payload, note("v1"));

    first.close().unwrap();
    let err = second.get::<Note>(id).unwrap_err();
    assert!(matches!(err, RepositoryError::Backend(StoreError::Closed)));
}

#[test]
fn test_close_covers_writes_in_flight() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let ids: Vec<_> = (0..4).map(|_| DocumentId::new()).collect();
    let acked = Arc::new(std::sync::atomic::AtomicU64::new(0));

    {
        let db = Arc::new(
            RevisionDb::builder()
                .path(dir.path())
                .batched(1_000)
                .open()
                .unwrap(),
        );
        for id in &ids {
            db.documents.add(*id, 0u64).unwrap();
        }
        let barrier = Arc::new(Barrier::new(ids.len() + 1));

        let writers: Vec<_> = ids
            .iter()
            .map(|id| {
                let db = Arc::clone(&db);
                let barrier = Arc::clone(&barrier);
                let acked = Arc::clone(&acked);
                let id = *id;
                thread::spawn(move || {
                    barrier.wait();
                    loop {
                        match db.documents.update_with(id, |n: &mut u64| *n += 1) {
                            Ok(_) => {
                                acked.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                            }
                            Err(Error::Storage(StoreError::Closed)) => break,
                            Err(e) => panic!("unexpected error: {}", e),
                        }
                    }
                })
            })
            .collect();

        barrier.wait();
        thread::sleep(std::time::Duration::from_millis(20));
        db.close().unwrap();
        assert_eq!(db.metrics().active_sessions, 0);
        for w in writers {
            w.join().unwrap();
        }
    }

    let db = RevisionDb::open(dir.path()).unwrap();
    let total: u64 = ids
        .iter()
        .map(|id| db.documents.get::<u64>(*id).unwrap().payload)
        .sum();
    assert_eq!(total, acked.load(std::sync::atomic::Ordering::Relaxed));
}
