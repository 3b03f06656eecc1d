// navdesk state managers
// Managers own the read-modify-write cycles: categories, bookmarks, icon assets, sessions.

pub mod asset_manager;
pub mod bookmark_manager;
pub mod category_manager;
pub mod session_manager;

use chrono::Utc;
use uuid::Uuid;

/// Opaque id of the form `<prefix>_<unix-nanos>_<8 hex chars>`.
pub fn generate_id(prefix: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, nanos, &suffix[..8])
}
