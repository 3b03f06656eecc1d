//! RPC method handler for the navdesk JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! Read methods are anonymous; mutating methods need a `token` from
//! `auth.login`, and the resolved actor is passed into the lifecycle call.

use std::sync::Mutex;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::error;

use crate::app::App;
use crate::managers::bookmark_manager::BookmarkManagerTrait;
use crate::managers::category_manager::CategoryManagerTrait;
use crate::managers::session_manager::SessionManagerTrait;
use crate::services::dashboard;
use crate::services::identity::IdentityProviderTrait;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::storage::Repository;
use crate::types::bookmark::{BookmarkFilter, BookmarkInput};
use crate::types::category::CategoryInput;
use crate::types::errors::NavError;
use crate::types::settings::SettingsUpdate;

/// Encode bytes to base64 string.
pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decode base64 string to bytes.
pub fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    BASE64.decode(input).map_err(|e| format!("base64 decode error: {}", e))
}

/// Maps a domain error to the message sent to the caller.
///
/// Storage failures are logged in full and reported generically.
fn nav_err(method: &str, err: NavError) -> String {
    if let NavError::Storage(ref inner) = err {
        error!(method, error = %inner, "storage failure");
    }
    err.public_message()
}

fn str_param<'p>(params: &'p Value, key: &str) -> Result<&'p str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn parse_params<T: DeserializeOwned>(params: &Value) -> Result<T, String> {
    serde_json::from_value(params.clone()).map_err(|e| format!("invalid params: {}", e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    let err = |e: NavError| nav_err(method, e);
    let token = params.get("token").and_then(|v| v.as_str());

    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Auth ───
        "auth.login" => {
            let username = str_param(params, "username")?;
            let password = str_param(params, "password")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let actor = a.identity().authenticate(username, password).map_err(err)?;
            let token = a.sessions.login(actor.clone());
            Ok(json!({"token": token, "username": actor.username, "role": actor.role}))
        }
        "auth.logout" => {
            let token = str_param(params, "token")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.sessions.logout(token);
            Ok(json!({"ok": true}))
        }
        "auth.status" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            match token.and_then(|t| a.sessions.resolve(t)) {
                Some(session) => Ok(json!({
                    "loggedIn": true,
                    "username": session.actor.username,
                    "role": session.actor.role,
                    "loginTime": session.login_time,
                })),
                None => Ok(json!({"loggedIn": false})),
            }
        }

        // ─── Public view ───
        "data.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut view = dashboard::snapshot(&a.store).map_err(err)?;
            for bookmark in &mut view.bookmarks {
                bookmark.icon = a.assets.display_icon(&bookmark.icon);
            }
            to_json(&view)
        }

        // ─── Categories ───
        "category.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let categories = a.categories().list_categories().map_err(err)?;
            to_json(&categories)
        }
        "category.get" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let category = a.categories().get_category(id).map_err(err)?;
            to_json(&category)
        }
        "category.create" => {
            let input: CategoryInput = parse_params(params)?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let actor = a.require_actor(token).map_err(err)?;
            let category = a.categories().create_category(&input, &actor).map_err(err)?;
            to_json(&category)
        }
        "category.update" => {
            let id = str_param(params, "id")?;
            let input: CategoryInput = parse_params(params)?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let actor = a.require_actor(token).map_err(err)?;
            let category = a.categories().update_category(id, &input, &actor).map_err(err)?;
            to_json(&category)
        }
        "category.delete" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let actor = a.require_actor(token).map_err(err)?;
            let removed = a.categories().delete_category(id, &actor).map_err(err)?;
            Ok(json!({"ok": true, "removedBookmarks": removed}))
        }

        // ─── Bookmarks ───
        "bookmark.list" => {
            let filter: BookmarkFilter = parse_params(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmarks = a.bookmarks().list_bookmarks(&filter).map_err(err)?;
            to_json(&bookmarks)
        }
        "bookmark.get" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmark = a.bookmarks().get_bookmark(id).map_err(err)?;
            to_json(&bookmark)
        }
        "bookmark.by_category" => {
            let category_id = str_param(params, "categoryId")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmarks = a.bookmarks().list_by_category(category_id).map_err(err)?;
            to_json(&bookmarks)
        }
        "bookmark.search" => {
            let keyword = str_param(params, "keyword")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmarks = a.bookmarks().search_bookmarks(keyword).map_err(err)?;
            to_json(&bookmarks)
        }
        "bookmark.create" => {
            let input: BookmarkInput = parse_params(params)?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let actor = a.require_actor(token).map_err(err)?;
            let bookmark = a.bookmarks().create_bookmark(&input, &actor).map_err(err)?;
            to_json(&bookmark)
        }
        "bookmark.update" => {
            let id = str_param(params, "id")?;
            let input: BookmarkInput = parse_params(params)?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let actor = a.require_actor(token).map_err(err)?;
            let bookmark = a.bookmarks().update_bookmark(id, &input, &actor).map_err(err)?;
            to_json(&bookmark)
        }
        "bookmark.delete" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let actor = a.require_actor(token).map_err(err)?;
            a.bookmarks().delete_bookmark(id, &actor).map_err(err)?;
            Ok(json!({"ok": true}))
        }

        // ─── Uploads and assets ───
        "upload.icon" => {
            let filename = str_param(params, "filename")?;
            let content = base64_decode(str_param(params, "content")?)?;
            let category = params.get("category").and_then(|v| v.as_str()).unwrap_or_default();
            let old_icon = params.get("oldIcon").and_then(|v| v.as_str());
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.require_actor(token).map_err(err)?;
            let categories = a.store.load_categories().map_err(|e| err(e.into()))?;
            let uploaded = a
                .assets
                .store_icon(category, filename, &content, old_icon, &categories)
                .map_err(err)?;
            to_json(&uploaded)
        }
        "upload.favicon" => {
            let filename = str_param(params, "filename")?;
            let content = base64_decode(str_param(params, "content")?)?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.require_actor(token).map_err(err)?;
            let uploaded = a.assets.store_favicon(filename, &content).map_err(err)?;
            to_json(&uploaded)
        }
        "asset.get" => {
            let icon = str_param(params, "icon")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let bytes = a.assets.read_asset(icon).map_err(err)?;
            Ok(json!({"icon": icon, "content": base64_encode(&bytes)}))
        }
        "assets.orphans" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.require_actor(token).map_err(err)?;
            let bookmarks = a.store.load_bookmarks().map_err(|e| err(e.into()))?;
            Ok(json!(a.assets.find_orphans(&bookmarks)))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let settings = a.settings().get_settings().map_err(err)?;
            to_json(&settings)
        }
        "settings.update" => {
            let update: SettingsUpdate = parse_params(params)?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let actor = a.require_actor(token).map_err(err)?;
            let settings = a.settings().update_settings(&update, &actor).map_err(err)?;
            to_json(&settings)
        }
        "settings.reset" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let actor = a.require_actor(token).map_err(err)?;
            let settings = a.settings().reset(&actor).map_err(err)?;
            to_json(&settings)
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
