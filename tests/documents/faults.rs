//! Backend failures are reported as backend failures

use crate::*;
use revisiondb_engine::RepositoryError;
use revisiondb_storage::FaultPoint;

#[test]
fn test_failure_before_write_leaves_store_untouched() {
    let repo = faulty_repo();
    let id = DocumentId::new();
    let mut doc = repo.add(id, note("v1")).unwrap();

    repo.handle().store().fail_next_writes(1, FaultPoint::BeforeWrite);
    doc.payload = note("v2");
    let err = repo.update(&mut doc).unwrap_err();

    assert!(err.is_backend());
    assert!(!err.is_conflict());
    assert_eq!(doc.revision, rev(1));
    assert_eq!(repo.get::<Note>(id).unwrap().revision, rev(1));

    // Retrying the same snapshot succeeds once the backend is back.
    repo.update(&mut doc).unwrap();
    assert_eq!(doc.revision, rev(2));
}

#[test]
fn test_lost_ack_is_backend_error_and_write_landed() {
    let repo = faulty_repo();
    let id = DocumentId::new();
    let mut doc = repo.add(id, note("v1")).unwrap();

    repo.handle().store().fail_next_writes(1, FaultPoint::AfterWrite);
    doc.payload = note("v2");
    let err = repo.update(&mut doc).unwrap_err();
    assert!(err.is_backend());
    assert_eq!(doc.revision, rev(1));

    let read: Document<Note> = repo.get(id).unwrap();
    assert_eq!(read.revision, rev(2));
    assert_eq!(read.payload, note("v2"));

    // The stale snapshot now conflicts; the caller learns who won by reading.
    assert!(repo.update(&mut doc).unwrap_err().is_conflict());
}

#[test]
fn test_failed_add_is_not_already_exists() {
    let repo = faulty_repo();
    let id = DocumentId::new();

    repo.handle().store().fail_next_writes(1, FaultPoint::BeforeWrite);
    let err = repo.add(id, note("v1")).unwrap_err();
    assert!(matches!(err, RepositoryError::Backend(_)));
    assert!(!repo.exists(id).unwrap());
}

#[test]
fn test_read_failures_propagate() {
    let repo = faulty_repo();
    let id = DocumentId::new();
    repo.add(id, note("v1")).unwrap();

    repo.handle().store().set_fail_reads(true);
    assert!(repo.get::<Note>(id).unwrap_err().is_backend());
    repo.handle().store().heal();
    assert!(repo.get::<Note>(id).is_ok());
}

#[test]
fn test_random_loss_never_masquerades_as_conflict() {
    let repo = faulty_repo();
    let id = DocumentId::new();
    repo.add(id, 0u32).unwrap();
    repo.handle().store().set_write_loss_rate(0.3);

    let mut doc: Document<u32> = repo.get(id).unwrap();
    for _ in 0..200 {
        doc.payload += 1;
        match repo.update(&mut doc) {
            Ok(_) => {}
            Err(e) if e.is_backend() => {
                // The write may have landed; resync from the store.
                repo.handle().store().heal();
                doc = repo.get(id).unwrap();
                repo.handle().store().set_write_loss_rate(0.3);
            }
            Err(e) => panic!("sequential writer saw {:?}", e),
        }
    }

    let m = repo.metrics();
    assert_eq!(m.conflicts, 0);
    assert_eq!(m.backend_failures, repo.handle().store().injected());
}
