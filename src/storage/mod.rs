//! navdesk persistence layer.
//!
//! Every collection lives in one whole-file JSON document under the data root.
//! Nothing is cached: each call re-reads or rewrites the full file.
//!
//! # Usage
//!
//! ```no_run
//! use navdesk::storage::{JsonStore, Repository};
//!
//! let store = JsonStore::new("./data");
//! store.init().expect("failed to seed data directory");
//!
//! let mut categories = store.load_categories().expect("failed to load categories");
//! categories.retain(|c| c.name != "Old");
//! store.save_categories(&categories).expect("failed to save categories");
//! ```

pub mod json_store;

pub use json_store::{DataFile, JsonStore};

use crate::types::bookmark::Bookmark;
use crate::types::category::Category;
use crate::types::errors::StorageError;
use crate::types::settings::Settings;
use crate::types::user::UserDirectory;

/// Read-modify-write access to the persisted collections.
///
/// Lifecycle managers depend on this trait only, so the backing store can be
/// swapped without touching validation or asset logic.
pub trait Repository {
    fn load_categories(&self) -> Result<Vec<Category>, StorageError>;
    fn save_categories(&self, categories: &[Category]) -> Result<(), StorageError>;
    fn load_bookmarks(&self) -> Result<Vec<Bookmark>, StorageError>;
    fn save_bookmarks(&self, bookmarks: &[Bookmark]) -> Result<(), StorageError>;
    /// Returns the default record when no settings have been saved yet.
    fn load_settings(&self) -> Result<Settings, StorageError>;
    /// Stamps `updated_at` before writing.
    fn save_settings(&self, settings: &Settings) -> Result<Settings, StorageError>;
    fn load_users(&self) -> Result<UserDirectory, StorageError>;
}
