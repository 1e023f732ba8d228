//! Journaled stores across reopen

use crate::*;
use std::fs::OpenOptions;
use std::io::Write;

fn strict_db(dir: &std::path::Path) -> RevisionDb {
    init_tracing();
    RevisionDb::builder().path(dir).strict().open().unwrap()
}

#[test]
fn test_acknowledged_writes_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let a = DocumentId::new();
    let b = DocumentId::new();

    {
        let db = strict_db(dir.path());
        let mut doc = db.documents.add(a, note("a1")).unwrap();
        doc.payload = note("a2");
        db.documents.update(&mut doc).unwrap();
        db.documents.seed(b, note("b"), rev(9)).unwrap();
        db.close().unwrap();
    }

    let db = strict_db(dir.path());
    let read_a: Document<Note> = db.documents.get(a).unwrap();
    assert_eq!(read_a.payload, note("a2"));
    assert_eq!(read_a.revision, rev(2));
    assert_eq!(db.documents.get::<Note>(b).unwrap().revision, rev(9));
    assert_eq!(db.metrics().documents, 2);
}

#[test]
fn test_conflict_check_holds_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = DocumentId::new();

    let stale = {
        let db = strict_db(dir.path());
        let mut doc = db.documents.add(id, note("v1")).unwrap();
        let stale = doc.clone();
        db.documents.update(&mut doc).unwrap();
        stale
    };

    let db = strict_db(dir.path());
    let mut stale = stale;
    assert!(db.documents.update(&mut stale).unwrap_err().is_conflict());
}

#[test]
fn test_batched_mode_flush_then_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = DocumentId::new();

    {
        init_tracing();
        let db = RevisionDb::builder()
            .path(dir.path())
            .batched(1_000)
            .open()
            .unwrap();
        let mut doc = db.documents.add(id, 0u32).unwrap();
        for n in 1..=10u32 {
            doc.payload = n;
            db.documents.update(&mut doc).unwrap();
        }
        db.flush().unwrap();
    }

    let db = RevisionDb::open(dir.path()).unwrap();
    let doc: Document<u32> = db.documents.get(id).unwrap();
    assert_eq!(doc.payload, 10);
    assert_eq!(doc.revision, rev(11));
}

#[test]
fn test_torn_final_record_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let id = DocumentId::new();

    {
        let db = strict_db(dir.path());
        let mut doc = db.documents.add(id, note("kept")).unwrap();
        doc.payload = note("also kept");
        db.documents.update(&mut doc).unwrap();
        db.close().unwrap();
    }

    // A crash mid-append leaves a frame header with no body.
    let wal = dir.path().join(revisiondb_durability::WAL_FILENAME);
    let mut file = OpenOptions::new().append(true).open(&wal).unwrap();
    file.write_all(&[0x40, 0, 0, 0, 0xde, 0xad]).unwrap();
    drop(file);

    let db = strict_db(dir.path());
    let doc: Document<Note> = db.documents.get(id).unwrap();
    assert_eq!(doc.payload, note("also kept"));
    assert_eq!(doc.revision, rev(2));

    let mut doc = doc;
    db.documents.update(&mut doc).unwrap();
    assert_eq!(doc.revision, rev(3));
}

#[test]
fn test_corrupted_journal_refuses_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let id = DocumentId::new();

    {
        let db = strict_db(dir.path());
        let mut doc = db.documents.add(id, note("one")).unwrap();
        db.documents.update(&mut doc).unwrap();
    }

    let wal = dir.path().join(revisiondb_durability::WAL_FILENAME);
    let mut bytes = std::fs::read(&wal).unwrap();
    // Flip a byte inside the first frame's body.
    bytes[12] ^= 0xFF;
    std::fs::write(&wal, &bytes).unwrap();

    let err = RevisionDb::builder()
        .path(dir.path())
        .strict()
        .open()
        .err()
        .unwrap();
    assert!(err.is_backend());
    assert!(err.is_serious());
}

#[test]
fn test_zero_filled_tail_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let id = DocumentId::new();

    {
        let db = strict_db(dir.path());
        db.documents.add(id, note("kept")).unwrap();
        db.close().unwrap();
    }

    // Power loss can leave zeroed blocks past the last frame.
    let wal = dir.path().join(revisiondb_durability::WAL_FILENAME);
    let mut file = OpenOptions::new().append(true).open(&wal).unwrap();
    file.write_all(&[0u8; 512]).unwrap();
    drop(file);

    let db = strict_db(dir.path());
    let mut doc: Document<Note> = db.documents.get(id).unwrap();
    assert_eq!(doc.payload, note("kept"));
    db.documents.update(&mut doc).unwrap();
    assert_eq!(doc.revision, rev(2));
}

#[test]
fn test_oversized_document_is_refused_and_store_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let id = DocumentId::new();
    let huge = "x".repeat(revisiondb_durability::encoding::MAX_BODY_LEN);

    {
        let db = strict_db(dir.path());
        let err = db.documents.add(DocumentId::new(), huge).unwrap_err();
        assert!(err.is_backend());
        assert!(!err.is_conflict());

        let mut doc = db.documents.add(id, note("small")).unwrap();
        doc.payload = note("still writable");
        db.documents.update(&mut doc).unwrap();
        db.close().unwrap();
    }

    let db = strict_db(dir.path());
    assert_eq!(db.metrics().documents, 1);
    let doc: Document<Note> = db.documents.get(id).unwrap();
    assert_eq!(doc.payload, note("still writable"));
    assert_eq!(doc.revision, rev(2));
}
