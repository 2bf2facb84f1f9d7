//! Tests for saving and restoring in-progress form answers.

use chrono::DateTime;
use form_engine::{FileStore, FormData, KeyValueStore, MemoryStore, ProgressPersistence};
use serde_json::json;

fn answers() -> FormData {
    json!({"name": "Ada", "topics": ["billing", "support"], "size": 4})
        .as_object()
        .cloned()
        .unwrap()
}

#[test]
fn save_then_load_returns_the_same_answers() {
    let mut progress = ProgressPersistence::new(MemoryStore::new());

    let saved = progress.save("signup", &answers()).unwrap();
    let loaded = progress.load("signup").expect("progress was saved");

    assert_eq!(loaded, saved);
    assert_eq!(loaded.form_id, "signup");
    assert_eq!(loaded.data, answers());
    assert!(DateTime::parse_from_rfc3339(&loaded.saved_at).is_ok());
    assert!(loaded.saved_at.ends_with('Z'));
}

#[test]
fn entries_are_keyed_by_form_id() {
    let mut progress = ProgressPersistence::new(MemoryStore::new());
    progress.save("a", &answers()).unwrap();

    assert!(progress.load("b").is_none());
    assert!(progress.store().get("form_progress_a").unwrap().is_some());
}

#[test]
fn stored_value_has_the_documented_shape() {
    let mut progress = ProgressPersistence::new(MemoryStore::new());
    progress.save("42", &answers()).unwrap();

    let raw = progress.store().get("form_progress_42").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["form_id"], "42");
    assert_eq!(value["data"]["name"], "Ada");
    assert!(value["saved_at"].is_string());
}

#[test]
fn clear_removes_progress() {
    let mut progress = ProgressPersistence::new(MemoryStore::new());
    progress.save("signup", &answers()).unwrap();

    progress.clear("signup").unwrap();
    assert!(progress.load("signup").is_none());
    // Clearing twice is fine.
    progress.clear("signup").unwrap();
}

#[test]
fn malformed_progress_is_treated_as_absent() {
    let mut store = MemoryStore::new();
    store.set("form_progress_broken", "{not json".to_string()).unwrap();
    store
        .set("form_progress_wrong_shape", r#"{"form_id": 1}"#.to_string())
        .unwrap();
    let progress = ProgressPersistence::new(store);

    assert!(progress.load("broken").is_none());
    assert!(progress.load("wrong_shape").is_none());
}

#[test]
fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = ProgressPersistence::new(FileStore::open(dir.path()).unwrap());
    first.save("team/intake form", &answers()).unwrap();

    let second = ProgressPersistence::new(FileStore::open(dir.path()).unwrap());
    let loaded = second.load("team/intake form").expect("saved on disk");
    assert_eq!(loaded.data, answers());

    // Unsafe path characters are percent-encoded into the file name.
    assert!(dir.path().join("form_progress_team%2Fintake%20form.json").exists());
}

#[test]
fn file_store_keeps_similar_keys_apart() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path()).unwrap();

    store.set("a/b", "slash".to_string()).unwrap();
    store.set("a_b", "underscore".to_string()).unwrap();
    store.set("a b", "space".to_string()).unwrap();

    assert_eq!(store.get("a/b").unwrap().as_deref(), Some("slash"));
    assert_eq!(store.get("a_b").unwrap().as_deref(), Some("underscore"));
    assert_eq!(store.get("a b").unwrap().as_deref(), Some("space"));

    store.remove("a/b").unwrap();
    assert_eq!(store.get("a/b").unwrap(), None);
    assert_eq!(store.get("a_b").unwrap().as_deref(), Some("underscore"));
}

#[test]
fn file_store_missing_key_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path().join("nested")).unwrap();

    assert_eq!(store.get("nothing").unwrap(), None);
    store.remove("nothing").unwrap();
}
