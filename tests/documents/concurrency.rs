//! Racing writers
//!
//! Threads line up on a `Barrier` so updates overlap as much as possible.

use crate::*;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

const WRITERS: usize = 16;

#[test]
fn test_single_writer_wins_per_snapshot() {
    let db = Arc::new(ephemeral_db());
    let id = DocumentId::new();
    db.documents.add(id, note("base")).unwrap();

    for round in 1..=10u64 {
        let snapshot: Document<Note> = db.documents.get(id).unwrap();
        assert_eq!(snapshot.revision, rev(round));

        let barrier = Arc::new(Barrier::new(WRITERS));
        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let db = Arc::clone(&db);
                let barrier = Arc::clone(&barrier);
                let mut mine = snapshot.clone();
                mine.payload = note(&format!("round {} writer {}", round, i));
                thread::spawn(move || {
                    barrier.wait();
                    db.documents.update(&mut mine).map(|_| mine.payload)
                })
            })
            .collect();

        let mut winners = Vec::new();
        for h in handles {
            match h.join().unwrap() {
                Ok(payload) => winners.push(payload),
                Err(e) => assert!(e.is_conflict(), "unexpected error: {}", e),
            }
        }

        assert_eq!(winners.len(), 1, "round {}", round);
        let stored: Document<Note> = db.documents.get(id).unwrap();
        assert_eq!(stored.revision, rev(round + 1));
        assert_eq!(stored.payload, winners[0]);
    }

    let m = db.metrics().repository;
    assert_eq!(m.updates_committed, 10);
    assert_eq!(m.conflicts, 10 * (WRITERS as u64 - 1));
}

#[test]
fn test_distinct_documents_never_conflict() {
    let db = Arc::new(ephemeral_db());
    let ids: Vec<_> = (0..WRITERS).map(|_| DocumentId::new()).collect();
    for id in &ids {
        db.documents.add(*id, note("start")).unwrap();
    }

    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles: Vec<_> = ids
        .iter()
        .map(|id| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            let id = *id;
            thread::spawn(move || {
                let mut doc: Document<Note> = db.documents.get(id).unwrap();
                barrier.wait();
                for _ in 0..50 {
                    db.documents.update(&mut doc).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for id in &ids {
        assert_eq!(db.documents.get::<Note>(*id).unwrap().revision, rev(51));
    }
    assert_eq!(db.metrics().repository.conflicts, 0);
}

#[test]
fn test_update_with_serializes_increments() {
    init_tracing();
    let db = Arc::new(
        RevisionDb::builder()
            .no_durability()
            .retry(RetryPolicy {
                max_attempts: 10_000,
                base_backoff_ms: 0,
                max_backoff_ms: 2,
            })
            .open()
            .unwrap(),
    );
    let id = DocumentId::new();
    db.documents.add(id, 0u64).unwrap();

    const PER_WRITER: u64 = 20;
    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut seen = Vec::new();
                for _ in 0..PER_WRITER {
                    let doc = db.documents.update_with(id, |n: &mut u64| *n += 1).unwrap();
                    seen.push(doc.revision);
                }
                seen
            })
        })
        .collect();

    let mut revisions = HashSet::new();
    for h in handles {
        for r in h.join().unwrap() {
            assert!(revisions.insert(r), "revision {} committed twice", r);
        }
    }

    let total = 8 * PER_WRITER;
    let doc: Document<u64> = db.documents.get(id).unwrap();
    assert_eq!(doc.payload, total);
    assert_eq!(doc.revision, rev(total + 1));
    assert_eq!(revisions.len() as u64, total);
}

#[test]
fn test_concurrent_add_same_id_single_creator() {
    let db = Arc::new(ephemeral_db());
    let id = DocumentId::new();
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                db.documents.add(id, note(&format!("creator {}", i))).is_ok()
            })
        })
        .collect();

    let created = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(created, 1);
    assert_eq!(db.documents.get::<Note>(id).unwrap().revision, Revision::INITIAL);
}
