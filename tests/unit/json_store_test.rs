//! Unit tests for the JSON file store.
//!
//! Each test runs against its own temporary data directory.

use std::fs;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use navdesk::storage::{DataFile, JsonStore, Repository};
use navdesk::types::bookmark::Bookmark;
use navdesk::types::category::Category;
use navdesk::types::errors::StorageError;
use navdesk::types::settings::{Settings, ThemeMode};
use navdesk::types::timestamp;

fn setup() -> (JsonStore, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let store = JsonStore::new(tmp.path());
    (store, tmp)
}

fn category(id: &str, sort: i64) -> Category {
    Category {
        id: id.to_string(),
        name: format!("name-{}", id),
        icon: "fa-folder".to_string(),
        upload_dir: format!("dir-{}", id),
        sort,
        created_at: timestamp::now(),
        updated_at: None,
    }
}

#[test]
fn test_init_seeds_empty_collections_and_uploads_dir() {
    let (store, tmp) = setup();
    store.init().unwrap();

    assert!(tmp.path().join("uploads").is_dir());
    assert!(store.load_categories().unwrap().is_empty());
    assert!(store.load_bookmarks().unwrap().is_empty());
}

#[test]
fn test_init_keeps_existing_files() {
    let (store, _tmp) = setup();
    store.init().unwrap();
    store.save_categories(&[category("a", 1)]).unwrap();

    store.init().unwrap();
    assert_eq!(store.load_categories().unwrap().len(), 1);
}

#[test]
fn test_missing_file_is_read_error() {
    let (store, _tmp) = setup();
    let err = store.load_bookmarks().unwrap_err();
    assert!(matches!(err, StorageError::Read { .. }));
}

#[test]
fn test_corrupt_file_is_parse_error() {
    let (store, _tmp) = setup();
    fs::write(store.path_of(DataFile::Categories), "{not json").unwrap();
    let err = store.load_categories().unwrap_err();
    assert!(matches!(err, StorageError::Parse { .. }));
}

#[test]
fn test_settings_default_when_absent() {
    let (store, _tmp) = setup();
    assert_eq!(store.load_settings().unwrap(), Settings::default());
}

#[test]
fn test_save_settings_stamps_updated_at() {
    let (store, _tmp) = setup();
    let mut settings = Settings::default();
    settings.theme = ThemeMode::Dark;

    let saved = store.save_settings(&settings).unwrap();
    assert!(saved.updated_at.is_some());

    let loaded = store.load_settings().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.theme, ThemeMode::Dark);
}

#[test]
fn test_write_is_pretty_printed_and_stable() {
    let (store, _tmp) = setup();
    store.save_categories(&[category("a", 1), category("b", 2)]).unwrap();
    let first = fs::read_to_string(store.path_of(DataFile::Categories)).unwrap();
    assert!(first.contains("\n  {"));
    assert!(first.contains("\"uploadDir\""));

    let loaded = store.load_categories().unwrap();
    store.save_categories(&loaded).unwrap();
    let second = fs::read_to_string(store.path_of(DataFile::Categories)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_null_tags_load_as_empty() {
    let (store, _tmp) = setup();
    fs::write(
        store.path_of(DataFile::Bookmarks),
        r#"[{"id":"b1","name":"Rust","url":"https://www.rust-lang.org","icon":"","category":"all",
            "tags":null,"sort":1,"createdAt":"2024-01-01T00:00:00Z"}]"#,
    )
    .unwrap();

    let bookmarks: Vec<Bookmark> = store.load_bookmarks().unwrap();
    assert_eq!(bookmarks.len(), 1);
    assert!(bookmarks[0].tags.is_empty());
    assert_eq!(bookmarks[0].description, "");
}

#[test]
fn test_rewrite_keeps_timestamp_offset_and_precision() {
    let (store, _tmp) = setup();
    fs::write(
        store.path_of(DataFile::Bookmarks),
        r#"[{"id":"b1","name":"Rust","url":"https://www.rust-lang.org","icon":"","category":"all",
            "tags":[],"sort":1,"createdAt":"2024-05-01T10:00:00.123456+08:00",
            "updatedAt":"2024-05-02T00:00:00.5Z"}]"#,
    )
    .unwrap();

    let loaded = store.load_bookmarks().unwrap();
    store.save_bookmarks(&loaded).unwrap();
    let rewritten = fs::read_to_string(store.path_of(DataFile::Bookmarks)).unwrap();

    assert!(rewritten.contains(r#""createdAt": "2024-05-01T10:00:00.123456+08:00""#));
    assert!(rewritten.contains(r#""updatedAt": "2024-05-02T00:00:00.5Z""#));
}

#[test]
fn test_load_users_skips_secret_key_and_malformed_entries() {
    let (store, _tmp) = setup();
    fs::write(
        store.path_of(DataFile::Users),
        r#"{
            "admin": {"username": "admin", "password": "pw", "role": "admin"},
            "broken": {"role": "admin"},
            "secretKey": "s3cr3t"
        }"#,
    )
    .unwrap();

    let directory = store.load_users().unwrap();
    assert_eq!(directory.secret_key, "s3cr3t");
    assert_eq!(directory.users.len(), 1);
    assert_eq!(directory.users["admin"].password, "pw");
}

#[test]
fn test_concurrent_writers_leave_valid_json() {
    let (store, _tmp) = setup();
    store.init().unwrap();
    let store = Arc::new(store);

    let handles: Vec<_> = ["x", "y"]
        .into_iter()
        .map(|id| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut categories = store.load_categories().unwrap();
                categories.push(category(id, 1));
                store.save_categories(&categories).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // One update may be lost, but the file always parses.
    let categories = store.load_categories().unwrap();
    assert!((1..=2).contains(&categories.len()));
}
