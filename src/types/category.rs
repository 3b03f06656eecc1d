use serde::{Deserialize, Serialize};

use super::timestamp::{self, Timestamp};

/// Reserved pseudo-category id meaning "no category filter".
///
/// Never stored as a real category; deleting it is rejected.
pub const ALL_CATEGORY_ID: &str = "all";

/// Upload subdirectory used when a bookmark's category has no directory of its own.
pub const COMMON_UPLOAD_DIR: &str = "common";

/// A named grouping of bookmarks with its own icon upload directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub upload_dir: String,
    pub sort: i64,
    #[serde(with = "timestamp::rfc3339")]
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::rfc3339_opt")]
    pub updated_at: Option<Timestamp>,
}

/// Fields accepted when creating or updating a category.
///
/// A `sort` of 0 on create means "append after the existing categories".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub upload_dir: String,
    #[serde(default)]
    pub sort: i64,
}
