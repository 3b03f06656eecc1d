//! Unit tests for the IdentityProvider: credential checks against users.json.

use std::fs;

use tempfile::TempDir;

use navdesk::services::identity::{hash_password, IdentityProvider, IdentityProviderTrait};
use navdesk::storage::{DataFile, JsonStore};
use navdesk::types::errors::NavError;

fn store_with_users(users_json: &str) -> (JsonStore, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let store = JsonStore::new(tmp.path());
    fs::write(store.path_of(DataFile::Users), users_json).unwrap();
    (store, tmp)
}

#[test]
fn test_plaintext_login() {
    let (store, _tmp) = store_with_users(
        r#"{"admin": {"username": "admin", "password": "admin123", "role": "admin"}, "secretKey": "k"}"#,
    );
    let identity = IdentityProvider::new(&store);

    let actor = identity.authenticate("admin", "admin123").unwrap();
    assert_eq!(actor.username, "admin");
    assert_eq!(actor.role, "admin");
    assert_eq!(identity.secret_key().unwrap(), "k");
}

#[test]
fn test_hashed_login() {
    let hash = hash_password("correct horse").unwrap();
    let users = format!(
        r#"{{"ops": {{"username": "ops", "password": "{}", "role": "editor"}}}}"#,
        hash
    );
    let (store, _tmp) = store_with_users(&users);
    let identity = IdentityProvider::new(&store);

    assert_eq!(identity.authenticate("ops", "correct horse").unwrap().role, "editor");
    assert!(matches!(
        identity.authenticate("ops", "battery staple"),
        Err(NavError::Unauthorized)
    ));
}

#[test]
fn test_wrong_password_and_unknown_user_are_unauthorized() {
    let (store, _tmp) = store_with_users(
        r#"{"admin": {"username": "admin", "password": "admin123", "role": "admin"}}"#,
    );
    let identity = IdentityProvider::new(&store);

    assert!(matches!(
        identity.authenticate("admin", "nope"),
        Err(NavError::Unauthorized)
    ));
    assert!(matches!(
        identity.authenticate("ghost", "admin123"),
        Err(NavError::Unauthorized)
    ));
}

#[test]
fn test_missing_users_file_is_storage_error() {
    let tmp = TempDir::new().unwrap();
    let store = JsonStore::new(tmp.path());
    let identity = IdentityProvider::new(&store);
    assert!(matches!(
        identity.authenticate("admin", "admin123"),
        Err(NavError::Storage(_))
    ));
}
