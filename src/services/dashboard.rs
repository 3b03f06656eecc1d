// navdesk Dashboard view
// The read-only aggregate served to anonymous visitors: every category,
// every bookmark and the display settings in one payload.

use serde::Serialize;
use tracing::warn;

use crate::storage::Repository;
use crate::types::bookmark::{display_order, Bookmark};
use crate::types::category::Category;
use crate::types::errors::NavError;
use crate::types::settings::Settings;

/// Everything the public page needs to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub categories: Vec<Category>,
    pub bookmarks: Vec<Bookmark>,
    pub settings: Settings,
}

/// Loads and sorts the public view.
///
/// A broken settings file degrades to defaults; broken category or bookmark
/// files are storage errors.
pub fn snapshot(repo: &dyn Repository) -> Result<DashboardView, NavError> {
    let mut categories = repo.load_categories()?;
    let mut bookmarks = repo.load_bookmarks()?;
    let settings = repo.load_settings().unwrap_or_else(|e| {
        warn!(error = %e, "settings unreadable, using defaults");
        Settings::default()
    });

    categories.sort_by_key(|c| c.sort);
    bookmarks.sort_by(display_order);

    Ok(DashboardView {
        categories,
        bookmarks,
        settings,
    })
}
