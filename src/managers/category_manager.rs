//! Category Manager for navdesk.
//!
//! Implements `CategoryManagerTrait`: create/update/delete categories with
//! name and upload-directory uniqueness, plus the cascade that removes a
//! deleted category's bookmarks and icon files.

use tracing::info;

use super::asset_manager::{is_safe_segment, AssetManager, UPLOADS_PREFIX};
use super::generate_id;
use crate::storage::Repository;
use crate::types::category::{Category, CategoryInput, ALL_CATEGORY_ID};
use crate::types::errors::{EntityKind, NavError, ValidationReason};
use crate::types::timestamp;
use crate::types::user::Actor;

/// Trait defining category management operations.
pub trait CategoryManagerTrait {
    /// All categories ordered by `sort` ascending.
    fn list_categories(&self) -> Result<Vec<Category>, NavError>;
    fn get_category(&self, id: &str) -> Result<Category, NavError>;
    fn create_category(&mut self, input: &CategoryInput, actor: &Actor) -> Result<Category, NavError>;
    fn update_category(&mut self, id: &str, input: &CategoryInput, actor: &Actor) -> Result<Category, NavError>;
    /// Deletes the category and every bookmark in it. Returns the number of bookmarks removed.
    fn delete_category(&mut self, id: &str, actor: &Actor) -> Result<usize, NavError>;
}

/// Category manager over a repository and the uploads tree.
pub struct CategoryManager<'a> {
    repo: &'a dyn Repository,
    assets: &'a AssetManager,
}

impl<'a> CategoryManager<'a> {
    pub fn new(repo: &'a dyn Repository, assets: &'a AssetManager) -> Self {
        Self { repo, assets }
    }

    fn validate_input(input: &CategoryInput) -> Result<(), NavError> {
        if input.name.trim().is_empty() {
            return Err(ValidationReason::MissingField("name").into());
        }
        if input.icon.trim().is_empty() {
            return Err(ValidationReason::MissingField("icon").into());
        }
        if input.upload_dir.trim().is_empty() {
            return Err(ValidationReason::MissingField("uploadDir").into());
        }
        if !is_safe_segment(&input.upload_dir) {
            return Err(ValidationReason::InvalidUploadDir(input.upload_dir.clone()).into());
        }
        Ok(())
    }

    /// Rejects a name or upload directory already used by a category other than `exclude_id`.
    fn check_unique(
        categories: &[Category],
        input: &CategoryInput,
        exclude_id: Option<&str>,
    ) -> Result<(), NavError> {
        let mut others = categories
            .iter()
            .filter(|c| Some(c.id.as_str()) != exclude_id);

        if others.clone().any(|c| c.name == input.name) {
            return Err(ValidationReason::DuplicateName(input.name.clone()).into());
        }
        if others.any(|c| c.upload_dir == input.upload_dir) {
            return Err(ValidationReason::DuplicateUploadDir(input.upload_dir.clone()).into());
        }
        Ok(())
    }
}

impl<'a> CategoryManagerTrait for CategoryManager<'a> {
    fn list_categories(&self) -> Result<Vec<Category>, NavError> {
        let mut categories = self.repo.load_categories()?;
        categories.sort_by_key(|c| c.sort);
        Ok(categories)
    }

    fn get_category(&self, id: &str) -> Result<Category, NavError> {
        self.repo
            .load_categories()?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| NavError::not_found(EntityKind::Category, id))
    }

    /// Creates a category. A `sort` of 0 becomes the current category count.
    fn create_category(&mut self, input: &CategoryInput, actor: &Actor) -> Result<Category, NavError> {
        Self::validate_input(input)?;
        let mut categories = self.repo.load_categories()?;
        Self::check_unique(&categories, input, None)?;

        let sort = if input.sort == 0 {
            categories.len() as i64
        } else {
            input.sort
        };
        let category = Category {
            id: generate_id("cat"),
            name: input.name.clone(),
            icon: input.icon.clone(),
            upload_dir: input.upload_dir.clone(),
            sort,
            created_at: timestamp::now(),
            updated_at: None,
        };

        categories.push(category.clone());
        self.repo.save_categories(&categories)?;
        self.assets.ensure_upload_dir(&category.upload_dir);

        info!(
            actor = %actor.username,
            category = %category.name,
            upload_dir = %category.upload_dir,
            "category created"
        );
        Ok(category)
    }

    /// Replaces every editable field.
    ///
    /// When `upload_dir` changes, the category's bookmarks whose icons live in
    /// the old directory have their files moved and references rewritten, so
    /// the old directory name can be reused without touching them.
    fn update_category(&mut self, id: &str, input: &CategoryInput, actor: &Actor) -> Result<Category, NavError> {
        Self::validate_input(input)?;
        let mut categories = self.repo.load_categories()?;
        let index = categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| NavError::not_found(EntityKind::Category, id))?;
        Self::check_unique(&categories, input, Some(id))?;

        let old_dir = categories[index].upload_dir.clone();
        let dir_changed = old_dir != input.upload_dir;
        let mut bookmarks = if dir_changed {
            self.repo.load_bookmarks()?
        } else {
            Vec::new()
        };

        let category = &mut categories[index];
        category.name = input.name.clone();
        category.icon = input.icon.clone();
        category.upload_dir = input.upload_dir.clone();
        category.sort = input.sort;
        category.updated_at = Some(timestamp::now());
        let updated = category.clone();

        self.repo.save_categories(&categories)?;
        self.assets.ensure_upload_dir(&updated.upload_dir);

        if dir_changed {
            let old_prefix = format!("{}{}/", UPLOADS_PREFIX, old_dir);
            let mut moved = 0usize;
            for bookmark in bookmarks
                .iter_mut()
                .filter(|b| b.category == id && b.icon.starts_with(&old_prefix))
            {
                let new_icon = self.assets.move_icon(&bookmark.icon, id, id, &categories);
                if new_icon != bookmark.icon {
                    bookmark.icon = new_icon;
                    moved += 1;
                }
            }
            if moved > 0 {
                self.repo.save_bookmarks(&bookmarks)?;
                info!(category = id, from = %old_dir, to = %updated.upload_dir, icons = moved, "icons relocated");
            }
        }

        info!(
            actor = %actor.username,
            category = %updated.name,
            upload_dir = %updated.upload_dir,
            "category updated"
        );
        Ok(updated)
    }

    /// Cascade delete.
    ///
    /// The bookmark collection is written before the category collection and
    /// nothing is rolled back: if the second write fails, the bookmarks are
    /// gone while the category remains.
    fn delete_category(&mut self, id: &str, actor: &Actor) -> Result<usize, NavError> {
        if id == ALL_CATEGORY_ID {
            return Err(NavError::Forbidden(
                "the \"all\" category cannot be deleted".to_string(),
            ));
        }

        let mut categories = self.repo.load_categories()?;
        let index = categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| NavError::not_found(EntityKind::Category, id))?;

        let bookmarks = self.repo.load_bookmarks()?;
        let (owned, remaining): (Vec<_>, Vec<_>) =
            bookmarks.into_iter().partition(|b| b.category == id);

        for bookmark in &owned {
            self.assets.delete_icon_if_local(&bookmark.icon);
        }
        if !owned.is_empty() {
            info!(category = id, count = owned.len(), "removing bookmarks of deleted category");
            self.repo.save_bookmarks(&remaining)?;
        }

        let removed = categories.remove(index);
        self.assets.remove_upload_dir(&removed.upload_dir);
        self.repo.save_categories(&categories)?;

        info!(
            actor = %actor.username,
            category = %removed.name,
            bookmarks = owned.len(),
            "category deleted"
        );
        Ok(owned.len())
    }
}
