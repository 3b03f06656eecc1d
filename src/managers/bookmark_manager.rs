//! Bookmark Manager for navdesk.
//!
//! Implements `BookmarkManagerTrait`: CRUD, filtering and search over the
//! bookmark collection, keeping icon files in step with category changes.

use tracing::{debug, info};
use url::Url;

use super::asset_manager::{is_local_ref, AssetManager};
use super::generate_id;
use crate::storage::Repository;
use crate::types::bookmark::{display_order, Bookmark, BookmarkFilter, BookmarkInput, DEFAULT_ICON};
use crate::types::category::{Category, ALL_CATEGORY_ID};
use crate::types::errors::{EntityKind, NavError, ValidationReason};
use crate::types::timestamp;
use crate::types::user::Actor;

/// Trait defining bookmark management operations.
///
/// Every listing is ordered by `sort` ascending, ties broken by `createdAt`.
pub trait BookmarkManagerTrait {
    fn list_bookmarks(&self, filter: &BookmarkFilter) -> Result<Vec<Bookmark>, NavError>;
    fn list_by_category(&self, category_id: &str) -> Result<Vec<Bookmark>, NavError>;
    fn search_bookmarks(&self, keyword: &str) -> Result<Vec<Bookmark>, NavError>;
    fn get_bookmark(&self, id: &str) -> Result<Bookmark, NavError>;
    fn create_bookmark(&mut self, input: &BookmarkInput, actor: &Actor) -> Result<Bookmark, NavError>;
    fn update_bookmark(&mut self, id: &str, input: &BookmarkInput, actor: &Actor) -> Result<Bookmark, NavError>;
    /// Removes the bookmark and its local icon file. Returns the removed record.
    fn delete_bookmark(&mut self, id: &str, actor: &Actor) -> Result<Bookmark, NavError>;
}

/// Bookmark manager over a repository and the uploads tree.
pub struct BookmarkManager<'a> {
    repo: &'a dyn Repository,
    assets: &'a AssetManager,
}

impl<'a> BookmarkManager<'a> {
    pub fn new(repo: &'a dyn Repository, assets: &'a AssetManager) -> Self {
        Self { repo, assets }
    }

    /// Required fields and URL syntax. Runs before any file is read.
    fn validate_input(input: &BookmarkInput) -> Result<(), NavError> {
        if input.name.trim().is_empty() {
            return Err(ValidationReason::MissingField("name").into());
        }
        if input.url.trim().is_empty() {
            return Err(ValidationReason::MissingField("url").into());
        }
        if input.category.trim().is_empty() {
            return Err(ValidationReason::MissingField("category").into());
        }
        Url::parse(&input.url).map_err(|e| ValidationReason::BadUrl(format!("{}: {}", input.url, e)))?;
        Ok(())
    }

    /// Loads categories and checks that `category_id` is `"all"` or one of them.
    fn load_checked_categories(&self, category_id: &str) -> Result<Vec<Category>, NavError> {
        let categories = self.repo.load_categories()?;
        if category_id != ALL_CATEGORY_ID && !categories.iter().any(|c| c.id == category_id) {
            return Err(ValidationReason::UnknownCategory(category_id.to_string()).into());
        }
        Ok(categories)
    }

    fn check_unique_name(
        bookmarks: &[Bookmark],
        input: &BookmarkInput,
        exclude_id: Option<&str>,
    ) -> Result<(), NavError> {
        let taken = bookmarks.iter().any(|b| {
            Some(b.id.as_str()) != exclude_id && b.category == input.category && b.name == input.name
        });
        if taken {
            return Err(ValidationReason::DuplicateName(input.name.clone()).into());
        }
        Ok(())
    }

    /// Works out the icon reference to store when `old` is edited into `input`,
    /// performing any file move or delete that implies.
    fn transition_icon(&self, old: &Bookmark, input: &BookmarkInput, categories: &[Category]) -> String {
        let category_changed = old.category != input.category;

        if old.icon == input.icon {
            if category_changed && is_local_ref(&old.icon) {
                return self
                    .assets
                    .move_icon(&old.icon, &old.category, &input.category, categories);
            }
            return input.icon.clone();
        }

        if !is_local_ref(&old.icon) {
            return input.icon.clone();
        }

        if is_local_ref(&input.icon) {
            if category_changed {
                // The old file follows the bookmark and its relocated
                // reference is what gets stored.
                return self
                    .assets
                    .move_icon(&old.icon, &old.category, &input.category, categories);
            }
            // Same category: the upload step removed the old file when it
            // received the replacement.
            debug!(old = %old.icon, new = %input.icon, "icon replaced, old file left to upload step");
            return input.icon.clone();
        }

        self.assets.delete_icon_if_local(&old.icon);
        input.icon.clone()
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    /// Filters by category (`"all"` means none) and keyword, then sorts.
    fn list_bookmarks(&self, filter: &BookmarkFilter) -> Result<Vec<Bookmark>, NavError> {
        let category = filter
            .category
            .as_deref()
            .filter(|c| *c != ALL_CATEGORY_ID);
        let needle = filter
            .keyword
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default();

        let mut bookmarks: Vec<Bookmark> = self
            .repo
            .load_bookmarks()?
            .into_iter()
            .filter(|b| category.map_or(true, |c| b.category == c))
            .filter(|b| b.matches_keyword(&needle))
            .collect();
        bookmarks.sort_by(display_order);
        Ok(bookmarks)
    }

    fn list_by_category(&self, category_id: &str) -> Result<Vec<Bookmark>, NavError> {
        self.list_bookmarks(&BookmarkFilter {
            category: Some(category_id.to_string()),
            keyword: None,
        })
    }

    /// Case-insensitive substring search; an empty keyword returns everything.
    fn search_bookmarks(&self, keyword: &str) -> Result<Vec<Bookmark>, NavError> {
        self.list_bookmarks(&BookmarkFilter {
            category: None,
            keyword: Some(keyword.to_string()),
        })
    }

    fn get_bookmark(&self, id: &str) -> Result<Bookmark, NavError> {
        self.repo
            .load_bookmarks()?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| NavError::not_found(EntityKind::Bookmark, id))
    }

    /// Creates a bookmark. An empty icon becomes `/favicon.ico`; a `sort` of 0
    /// becomes one past the number of bookmarks already in the category.
    fn create_bookmark(&mut self, input: &BookmarkInput, actor: &Actor) -> Result<Bookmark, NavError> {
        Self::validate_input(input)?;
        self.load_checked_categories(&input.category)?;
        let mut bookmarks = self.repo.load_bookmarks()?;
        Self::check_unique_name(&bookmarks, input, None)?;

        let sort = if input.sort == 0 {
            bookmarks.iter().filter(|b| b.category == input.category).count() as i64 + 1
        } else {
            input.sort
        };
        let icon = if input.icon.is_empty() {
            DEFAULT_ICON.to_string()
        } else {
            input.icon.clone()
        };

        let bookmark = Bookmark {
            id: generate_id("bookmark"),
            name: input.name.clone(),
            url: input.url.clone(),
            description: input.description.clone(),
            icon,
            category: input.category.clone(),
            tags: input.tags.clone().unwrap_or_default(),
            sort,
            created_at: timestamp::now(),
            updated_at: None,
        };

        bookmarks.push(bookmark.clone());
        self.repo.save_bookmarks(&bookmarks)?;

        info!(
            actor = %actor.username,
            bookmark = %bookmark.name,
            category = %bookmark.category,
            "bookmark created"
        );
        Ok(bookmark)
    }

    /// Replaces every editable field, moving or deleting the icon file when
    /// the icon or category changes. `sort` is stored as given.
    fn update_bookmark(&mut self, id: &str, input: &BookmarkInput, actor: &Actor) -> Result<Bookmark, NavError> {
        Self::validate_input(input)?;
        let categories = self.load_checked_categories(&input.category)?;
        let mut bookmarks = self.repo.load_bookmarks()?;
        let index = bookmarks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| NavError::not_found(EntityKind::Bookmark, id))?;
        Self::check_unique_name(&bookmarks, input, Some(id))?;

        let old_category = bookmarks[index].category.clone();
        let mut icon = self.transition_icon(&bookmarks[index], input, &categories);
        if icon.is_empty() {
            icon = DEFAULT_ICON.to_string();
        }

        let bookmark = &mut bookmarks[index];
        bookmark.name = input.name.clone();
        bookmark.url = input.url.clone();
        bookmark.description = input.description.clone();
        bookmark.icon = icon;
        bookmark.category = input.category.clone();
        bookmark.tags = input.tags.clone().unwrap_or_default();
        bookmark.sort = input.sort;
        bookmark.updated_at = Some(timestamp::now());
        let updated = bookmark.clone();

        self.repo.save_bookmarks(&bookmarks)?;

        info!(
            actor = %actor.username,
            bookmark = %updated.name,
            from = %old_category,
            to = %updated.category,
            "bookmark updated"
        );
        Ok(updated)
    }

    fn delete_bookmark(&mut self, id: &str, actor: &Actor) -> Result<Bookmark, NavError> {
        let mut bookmarks = self.repo.load_bookmarks()?;
        let index = bookmarks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| NavError::not_found(EntityKind::Bookmark, id))?;

        let removed = bookmarks.remove(index);
        self.assets.delete_icon_if_local(&removed.icon);
        self.repo.save_bookmarks(&bookmarks)?;

        info!(
            actor = %actor.username,
            bookmark = %removed.name,
            category = %removed.category,
            "bookmark deleted"
        );
        Ok(removed)
    }
}
