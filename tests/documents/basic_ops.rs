//! Basic document operations

use crate::*;

#[test]
fn test_add_returns_revision_one() {
    let db = ephemeral_db();
    let id = DocumentId::new();
    let doc = db.documents.add(id, note("A")).unwrap();

    assert_eq!(doc.id, id);
    assert_eq!(doc.revision, Revision::INITIAL);
    assert_eq!(db.documents.count().unwrap(), 1);
}

#[test]
fn test_add_existing_id_fails() {
    let db = ephemeral_db();
    let id = DocumentId::new();
    db.documents.add(id, note("A")).unwrap();

    let err = db.documents.add(id, note("B")).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(e) if e == id));
    assert_eq!(db.documents.get::<Note>(id).unwrap().payload, note("A"));
}

#[test]
fn test_get_is_idempotent() {
    let db = ephemeral_db();
    let id = DocumentId::new();
    db.documents.add(id, note("A")).unwrap();

    let first: Document<Note> = db.documents.get(id).unwrap();
    let second: Document<Note> = db.documents.get(id).unwrap();
    assert_eq!(first, second);
    assert_eq!(db.metrics().repository.updates_committed, 0);
}

#[test]
fn test_find_and_exists() {
    let db = ephemeral_db();
    let id = DocumentId::new();
    assert!(db.documents.find::<Note>(id).unwrap().is_none());
    assert!(!db.documents.exists(id).unwrap());

    db.documents.add(id, note("A")).unwrap();
    assert!(db.documents.find::<Note>(id).unwrap().is_some());
    assert!(db.documents.exists(id).unwrap());
}

#[test]
fn test_seed_imports_at_revision() {
    let db = ephemeral_db();
    let id = DocumentId::new();
    let mut doc = db.documents.seed(id, note("imported"), rev(17)).unwrap();

    assert_eq!(db.documents.get::<Note>(id).unwrap().revision, rev(17));
    db.documents.update(&mut doc).unwrap();
    assert_eq!(doc.revision, rev(18));
}

#[test]
fn test_json_payloads() {
    let db = ephemeral_db();
    let id = DocumentId::new();
    let mut doc = db
        .documents
        .add(id, json!({"name": "Alice", "visits": 1}))
        .unwrap();

    doc.payload["visits"] = json!(2);
    db.documents.update(&mut doc).unwrap();

    let read: Document<serde_json::Value> = db.documents.get(id).unwrap();
    assert_eq!(read.payload["visits"], 2);
    assert_eq!(read.revision, rev(2));
}

#[test]
fn test_wrong_payload_type_is_serialization_error() {
    let db = ephemeral_db();
    let id = DocumentId::new();
    db.documents.add(id, 42u32).unwrap();

    let err = db.documents.get::<Note>(id).unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
    assert!(!err.is_conflict());
}

#[test]
fn test_documents_are_independent() {
    let db = ephemeral_db();
    let a = DocumentId::new();
    let b = DocumentId::new();
    let mut doc_a = db.documents.add(a, note("a")).unwrap();
    db.documents.add(b, note("b")).unwrap();

    for _ in 0..5 {
        db.documents.update(&mut doc_a).unwrap();
    }

    assert_eq!(db.documents.get::<Note>(a).unwrap().revision, rev(6));
    assert_eq!(db.documents.get::<Note>(b).unwrap().revision, rev(1));
}
