//! Unit tests for the key-value storage backends.
//!
//! The shared contract runs against every backend through `rstest` cases;
//! backend-specific behavior (quota, key validation, reopening) follows.

use rstest::rstest;
use tempfile::TempDir;

use vidsearch::app::{open_storage, DATABASE_FILE};
use vidsearch::database::migrations::CURRENT_SCHEMA_VERSION;
use vidsearch::database::Database;
use vidsearch::managers::search_history::{SearchHistory, SearchHistoryTrait};
use vidsearch::storage::{FileStorage, KeyValueStorage, MemoryStorage, SqliteStorage};
use vidsearch::types::errors::StorageError;
use vidsearch::types::settings::StorageBackendKind;

fn open(kind: StorageBackendKind) -> (Box<dyn KeyValueStorage>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let storage = open_storage(kind, tmp.path()).expect("Failed to open storage");
    (storage, tmp)
}

// ─── Shared contract ───

#[rstest]
#[case::memory(StorageBackendKind::Memory)]
#[case::file(StorageBackendKind::File)]
#[case::sqlite(StorageBackendKind::Sqlite)]
fn test_missing_key_reads_none(#[case] kind: StorageBackendKind) {
    let (storage, _tmp) = open(kind);
    assert_eq!(storage.get("absent").unwrap(), None);
}

#[rstest]
#[case::memory(StorageBackendKind::Memory)]
#[case::file(StorageBackendKind::File)]
#[case::sqlite(StorageBackendKind::Sqlite)]
fn test_set_get_overwrite_remove(#[case] kind: StorageBackendKind) {
    let (mut storage, _tmp) = open(kind);

    storage.set("slot", "[1,2,3]").unwrap();
    assert_eq!(storage.get("slot").unwrap().as_deref(), Some("[1,2,3]"));

    storage.set("slot", "[]").unwrap();
    assert_eq!(storage.get("slot").unwrap().as_deref(), Some("[]"));

    storage.remove("slot").unwrap();
    assert_eq!(storage.get("slot").unwrap(), None);

    // Removing again is not an error.
    storage.remove("slot").unwrap();
}

#[rstest]
#[case::memory(StorageBackendKind::Memory)]
#[case::file(StorageBackendKind::File)]
#[case::sqlite(StorageBackendKind::Sqlite)]
fn test_keys_are_independent(#[case] kind: StorageBackendKind) {
    let (mut storage, _tmp) = open(kind);

    storage.set("one", "1").unwrap();
    storage.set("two", "2").unwrap();
    storage.remove("one").unwrap();

    assert_eq!(storage.get("one").unwrap(), None);
    assert_eq!(storage.get("two").unwrap().as_deref(), Some("2"));
}

#[rstest]
#[case::memory(StorageBackendKind::Memory)]
#[case::file(StorageBackendKind::File)]
#[case::sqlite(StorageBackendKind::Sqlite)]
fn test_history_persists_through_backend(#[case] kind: StorageBackendKind) {
    let (storage, _tmp) = open(kind);
    let mut history = SearchHistory::open(storage);

    history.record("rust", 10).unwrap();
    history.record("tokio", 0).unwrap();
    history.record("rust", 7).unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history.records()[0].keyword, "rust");
    assert_eq!(history.records()[0].search_count, 2);
}

// ─── Memory ───

#[test]
fn test_memory_clones_share_entries() {
    let a = MemoryStorage::new();
    let mut b = a.clone();
    b.set("k", "v").unwrap();
    assert_eq!(a.raw("k").as_deref(), Some("v"));
}

#[test]
fn test_memory_quota() {
    let mut storage = MemoryStorage::with_quota(10);

    storage.set("k", "123456789").unwrap();
    // Replacing a value only counts the new size.
    storage.set("k", "987654321").unwrap();

    let err = storage.set("k2", "x").unwrap_err();
    assert!(matches!(
        err,
        StorageError::QuotaExceeded { needed: 13, available: 10 }
    ));
    assert_eq!(storage.get("k2").unwrap(), None);
}

// ─── File ───

#[test]
fn test_file_rejects_keys_escaping_directory() {
    let tmp = TempDir::new().unwrap();
    let mut storage = FileStorage::new(tmp.path());

    for key in ["", "../escape", "a/b", ".hidden", "with space"] {
        assert!(
            matches!(storage.set(key, "x"), Err(StorageError::InvalidKey(_))),
            "key {:?} should be rejected",
            key
        );
    }
}

#[test]
fn test_file_layout_and_reopen() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("nested").join("data");

    let mut storage = FileStorage::new(&dir);
    storage.set("video_search_history", "{}").unwrap();
    assert!(dir.join("video_search_history.json").is_file());
    assert!(!dir.join("video_search_history.json.tmp").exists());

    let reopened = FileStorage::new(&dir);
    assert_eq!(reopened.dir(), dir.as_path());
    assert_eq!(reopened.get("video_search_history").unwrap().as_deref(), Some("{}"));
}

// ─── SQLite ───

#[test]
fn test_sqlite_reopen_keeps_values() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(DATABASE_FILE);

    {
        let mut storage = SqliteStorage::open(&path).unwrap();
        storage.set("k", "persisted").unwrap();
    }

    let storage = SqliteStorage::open(&path).unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("persisted"));
}

#[test]
fn test_sqlite_wraps_migrated_database() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.schema_version(), CURRENT_SCHEMA_VERSION);

    let mut storage = SqliteStorage::new(db);
    storage.set("k", "v").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));

    let mut other = SqliteStorage::open_in_memory().unwrap();
    assert_eq!(other.get("k").unwrap(), None);
    other.remove("k").unwrap();
}
