//! Unit tests for the BookmarkManager public API.
//!
//! These tests exercise bookmark CRUD, search and the icon-file transitions
//! through the `BookmarkManagerTrait` interface, backed by a temporary data
//! directory.

use std::fs;

use tempfile::TempDir;

use navdesk::config::NavdeskConfig;
use navdesk::managers::asset_manager::AssetManager;
use navdesk::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use navdesk::managers::category_manager::{CategoryManager, CategoryManagerTrait};
use navdesk::storage::{JsonStore, Repository};
use navdesk::types::bookmark::{BookmarkFilter, BookmarkInput};
use navdesk::types::category::CategoryInput;
use navdesk::types::errors::{NavError, ValidationReason};
use navdesk::types::user::Actor;

struct Fixture {
    store: JsonStore,
    assets: AssetManager,
    cat_a: String,
    cat_b: String,
    _tmp: TempDir,
}

/// Helper: a data directory with categories A (`dirA`) and B (`dirB`).
fn setup() -> Fixture {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let store = JsonStore::new(tmp.path());
    store.init().unwrap();
    let assets = AssetManager::new(&NavdeskConfig::with_data_root(tmp.path()));

    let mut categories = CategoryManager::new(&store, &assets);
    let mut make = |name: &str, dir: &str| {
        categories
            .create_category(
                &CategoryInput {
                    name: name.to_string(),
                    icon: "fa-folder".to_string(),
                    upload_dir: dir.to_string(),
                    sort: 0,
                },
                &admin(),
            )
            .unwrap()
            .id
    };
    let cat_a = make("A", "dirA");
    let cat_b = make("B", "dirB");

    Fixture {
        store,
        assets,
        cat_a,
        cat_b,
        _tmp: tmp,
    }
}

fn admin() -> Actor {
    Actor::new("admin", "admin")
}

fn input(name: &str, category: &str) -> BookmarkInput {
    BookmarkInput {
        name: name.to_string(),
        url: format!("https://{}.example.com", name.to_lowercase()),
        category: category.to_string(),
        ..BookmarkInput::default()
    }
}

fn put_icon(assets: &AssetManager, dir: &str, file: &str) -> String {
    let path = assets.uploads_root().join(dir);
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join(file), b"png").unwrap();
    format!("/uploads/{}/{}", dir, file)
}

// ─── Create ───

#[test]
fn test_create_applies_defaults() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);

    let created = mgr.create_bookmark(&input("Rust", &fx.cat_a), &admin()).unwrap();

    assert!(created.id.starts_with("bookmark_"));
    assert_eq!(created.icon, "/favicon.ico");
    assert!(created.tags.is_empty());
    assert_eq!(created.sort, 1);
    assert!(created.updated_at.is_none());
}

#[test]
fn test_create_sort_follows_category_count() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    for name in ["One", "Two", "Three"] {
        mgr.create_bookmark(&input(name, &fx.cat_a), &admin()).unwrap();
    }
    mgr.create_bookmark(&input("Other", &fx.cat_b), &admin()).unwrap();

    let fourth = mgr.create_bookmark(&input("Four", &fx.cat_a), &admin()).unwrap();
    assert_eq!(fourth.sort, 4);
}

#[test]
fn test_create_accepts_all_category() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    let created = mgr.create_bookmark(&input("Loose", "all"), &admin()).unwrap();
    assert_eq!(created.category, "all");
}

#[test]
fn test_create_rejects_bad_url() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    let mut req = input("Broken", &fx.cat_a);
    req.url = "not a url".to_string();

    let err = mgr.create_bookmark(&req, &admin()).unwrap_err();
    assert!(matches!(err, NavError::Validation(ValidationReason::BadUrl(_))));
    assert!(fx.store.load_bookmarks().unwrap().is_empty());
}

#[test]
fn test_create_rejects_unknown_category() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    let err = mgr.create_bookmark(&input("Rust", "cat_missing"), &admin()).unwrap_err();
    assert!(matches!(
        err,
        NavError::Validation(ValidationReason::UnknownCategory(_))
    ));
}

#[test]
fn test_create_rejects_duplicate_name_in_same_category_only() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    mgr.create_bookmark(&input("Rust", &fx.cat_a), &admin()).unwrap();

    let err = mgr.create_bookmark(&input("Rust", &fx.cat_a), &admin()).unwrap_err();
    assert!(matches!(err, NavError::Validation(ValidationReason::DuplicateName(_))));

    assert!(mgr.create_bookmark(&input("Rust", &fx.cat_b), &admin()).is_ok());
}

// ─── Read ───

#[test]
fn test_listing_orders_by_sort_then_creation() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    let mut late = input("Late", &fx.cat_a);
    late.sort = 5;
    let mut tie_first = input("TieFirst", &fx.cat_a);
    tie_first.sort = 2;
    let mut tie_second = input("TieSecond", &fx.cat_a);
    tie_second.sort = 2;
    for req in [&late, &tie_first, &tie_second] {
        mgr.create_bookmark(req, &admin()).unwrap();
    }

    let names: Vec<String> = mgr
        .list_by_category(&fx.cat_a)
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(names, vec!["TieFirst", "TieSecond", "Late"]);
}

#[test]
fn test_search_matches_name_description_and_tags() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    let mut by_desc = input("Docs", &fx.cat_a);
    by_desc.description = "The RUST book".to_string();
    let mut by_tag = input("Crates", &fx.cat_b);
    by_tag.tags = Some(vec!["rust".to_string(), "registry".to_string()]);
    mgr.create_bookmark(&input("RustLang", &fx.cat_a), &admin()).unwrap();
    mgr.create_bookmark(&by_desc, &admin()).unwrap();
    mgr.create_bookmark(&by_tag, &admin()).unwrap();
    mgr.create_bookmark(&input("Go", &fx.cat_a), &admin()).unwrap();

    assert_eq!(mgr.search_bookmarks("Rust").unwrap().len(), 3);
    assert_eq!(mgr.search_bookmarks("").unwrap().len(), 4);

    let filtered = mgr
        .list_bookmarks(&BookmarkFilter {
            category: Some(fx.cat_a.clone()),
            keyword: Some("rust".to_string()),
        })
        .unwrap();
    assert_eq!(filtered.len(), 2);

    let everything = mgr
        .list_bookmarks(&BookmarkFilter {
            category: Some("all".to_string()),
            keyword: None,
        })
        .unwrap();
    assert_eq!(everything.len(), 4);
}

#[test]
fn test_get_unknown_is_not_found() {
    let fx = setup();
    let mgr = BookmarkManager::new(&fx.store, &fx.assets);
    assert!(matches!(
        mgr.get_bookmark("bookmark_missing"),
        Err(NavError::NotFound { .. })
    ));
}

// ─── Update and icon transitions ───

#[test]
fn test_category_change_moves_icon_once() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    let icon = put_icon(&fx.assets, "dirA", "x.png");
    let mut req = input("Rust", &fx.cat_a);
    req.icon = icon.clone();
    let created = mgr.create_bookmark(&req, &admin()).unwrap();

    req.category = fx.cat_b.clone();
    req.sort = created.sort;
    let updated = mgr.update_bookmark(&created.id, &req, &admin()).unwrap();

    assert_eq!(updated.icon, "/uploads/dirB/x.png");
    assert!(!fx.assets.uploads_root().join("dirA/x.png").exists());
    assert!(fx.assets.uploads_root().join("dirB/x.png").is_file());
    assert!(updated.updated_at.is_some());
    assert_eq!(fx.store.load_bookmarks().unwrap()[0].icon, "/uploads/dirB/x.png");
}

#[test]
fn test_category_change_with_new_local_icon_relocates_old_file() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    let old_icon = put_icon(&fx.assets, "dirA", "old.png");
    let new_icon = put_icon(&fx.assets, "dirA", "new.png");
    let mut req = input("Rust", &fx.cat_a);
    req.icon = old_icon;
    let created = mgr.create_bookmark(&req, &admin()).unwrap();

    req.icon = new_icon;
    req.category = fx.cat_b.clone();
    let updated = mgr.update_bookmark(&created.id, &req, &admin()).unwrap();

    // The old file follows the bookmark; the freshly uploaded one stays put.
    assert_eq!(updated.icon, "/uploads/dirB/old.png");
    assert!(fx.assets.uploads_root().join("dirB/old.png").is_file());
    assert!(!fx.assets.uploads_root().join("dirA/old.png").exists());
    assert!(fx.assets.uploads_root().join("dirA/new.png").is_file());
    assert!(!fx.assets.uploads_root().join("dirB/new.png").exists());
    assert_eq!(mgr.get_bookmark(&created.id).unwrap().icon, "/uploads/dirB/old.png");
}

#[test]
fn test_same_category_icon_replacement_leaves_old_file() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    let old_icon = put_icon(&fx.assets, "dirA", "old.png");
    let new_icon = put_icon(&fx.assets, "dirA", "new.png");
    let mut req = input("Rust", &fx.cat_a);
    req.icon = old_icon;
    let created = mgr.create_bookmark(&req, &admin()).unwrap();

    req.icon = new_icon.clone();
    let updated = mgr.update_bookmark(&created.id, &req, &admin()).unwrap();

    // Removing the old file is the upload step's job, not the update's.
    assert_eq!(updated.icon, new_icon);
    assert!(fx.assets.uploads_root().join("dirA/old.png").is_file());
}

#[test]
fn test_switching_to_external_icon_deletes_local_file() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    let old_icon = put_icon(&fx.assets, "dirA", "old.png");
    let mut req = input("Rust", &fx.cat_a);
    req.icon = old_icon;
    let created = mgr.create_bookmark(&req, &admin()).unwrap();

    req.icon = "https://cdn.example.com/rust.png".to_string();
    let updated = mgr.update_bookmark(&created.id, &req, &admin()).unwrap();

    assert_eq!(updated.icon, "https://cdn.example.com/rust.png");
    assert!(!fx.assets.uploads_root().join("dirA/old.png").exists());
}

#[test]
fn test_update_clearing_icon_stores_default() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    let mut req = input("Rust", &fx.cat_a);
    req.icon = "https://cdn.example.com/rust.png".to_string();
    let created = mgr.create_bookmark(&req, &admin()).unwrap();

    req.icon = String::new();
    let updated = mgr.update_bookmark(&created.id, &req, &admin()).unwrap();
    assert_eq!(updated.icon, "/favicon.ico");
}

#[test]
fn test_update_stores_sort_as_given() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    let created = mgr.create_bookmark(&input("Rust", &fx.cat_a), &admin()).unwrap();

    let updated = mgr
        .update_bookmark(&created.id, &input("Rust", &fx.cat_a), &admin())
        .unwrap();
    assert_eq!(updated.sort, 0);
}

// ─── Delete ───

#[test]
fn test_delete_removes_record_and_local_icon() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    let icon = put_icon(&fx.assets, "dirA", "x.png");
    let mut req = input("Rust", &fx.cat_a);
    req.icon = icon;
    let created = mgr.create_bookmark(&req, &admin()).unwrap();

    let removed = mgr.delete_bookmark(&created.id, &admin()).unwrap();

    assert_eq!(removed.id, created.id);
    assert!(fx.store.load_bookmarks().unwrap().is_empty());
    assert!(!fx.assets.uploads_root().join("dirA/x.png").exists());
}

#[test]
fn test_delete_with_external_icon_touches_no_files() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    let keep = put_icon(&fx.assets, "dirA", "keep.png");
    let mut req = input("Rust", &fx.cat_a);
    req.icon = "https://cdn.example.com/uploads/dirA/keep.png".to_string();
    let created = mgr.create_bookmark(&req, &admin()).unwrap();

    mgr.delete_bookmark(&created.id, &admin()).unwrap();

    assert!(fx.assets.local_path(&keep).unwrap().is_file());
}

#[test]
fn test_delete_unknown_is_not_found() {
    let fx = setup();
    let mut mgr = BookmarkManager::new(&fx.store, &fx.assets);
    assert!(matches!(
        mgr.delete_bookmark("bookmark_missing", &admin()),
        Err(NavError::NotFound { .. })
    ));
}
