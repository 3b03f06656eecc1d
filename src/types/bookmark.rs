use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::timestamp::{self, Timestamp};

/// Icon reference stored when a bookmark has no icon of its own.
pub const DEFAULT_ICON: &str = "/favicon.ico";

/// A single navigable link entry belonging to one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    pub sort: i64,
    #[serde(with = "timestamp::rfc3339")]
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::rfc3339_opt")]
    pub updated_at: Option<Timestamp>,
}

impl Bookmark {
    /// Case-insensitive substring match over name, description and tags.
    ///
    /// `needle` must already be lowercased. An empty needle matches everything.
    pub fn matches_keyword(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Listing order shared by every bookmark query: `sort` ascending, then `createdAt` ascending.
pub fn display_order(a: &Bookmark, b: &Bookmark) -> Ordering {
    a.sort
        .cmp(&b.sort)
        .then_with(|| a.created_at.cmp(&b.created_at))
}

/// Fields accepted when creating or updating a bookmark.
///
/// `tags: None` is stored as an empty list. A `sort` of 0 on create is auto-assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub sort: i64,
}

/// Restricts a bookmark listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookmarkFilter {
    /// Category id; `None` or `"all"` means every category.
    pub category: Option<String>,
    /// Keyword matched against name, description and tags.
    pub keyword: Option<String>,
}

// Files written by older versions may carry `"tags": null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
