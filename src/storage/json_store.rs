//! Whole-file JSON implementation of [`Repository`].
//!
//! Writes go through a temp file in the same directory followed by a rename,
//! so a concurrent reader sees either the previous or the next document and
//! never a truncated one. Two racing writers still lose one update.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::Repository;
use crate::types::bookmark::Bookmark;
use crate::types::category::Category;
use crate::types::errors::StorageError;
use crate::types::settings::Settings;
use crate::types::timestamp;
use crate::types::user::{User, UserDirectory, SECRET_KEY_FIELD};

/// The JSON documents kept under the data root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFile {
    Categories,
    Bookmarks,
    Settings,
    Users,
}

impl DataFile {
    pub fn file_name(self) -> &'static str {
        match self {
            DataFile::Categories => "categories.json",
            DataFile::Bookmarks => "bookmarks.json",
            DataFile::Settings => "settings.json",
            DataFile::Users => "users.json",
        }
    }
}

/// Repository backed by JSON files in a data directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_root: PathBuf,
}

impl JsonStore {
    pub fn new<P: AsRef<Path>>(data_root: P) -> Self {
        Self {
            data_root: data_root.as_ref().to_path_buf(),
        }
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    pub fn path_of(&self, file: DataFile) -> PathBuf {
        self.data_root.join(file.file_name())
    }

    /// Creates the data root and `uploads/`, and seeds empty category and
    /// bookmark collections when their files are absent.
    ///
    /// Existing files are never touched, so this is safe on every startup.
    pub fn init(&self) -> Result<(), StorageError> {
        let uploads = self.data_root.join("uploads");
        fs::create_dir_all(&uploads).map_err(|source| StorageError::Write {
            path: uploads.clone(),
            source,
        })?;

        for file in [DataFile::Categories, DataFile::Bookmarks] {
            let path = self.path_of(file);
            if !path.exists() {
                self.write_json(file, &Vec::<Value>::new())?;
                info!(path = %path.display(), "seeded empty collection");
            }
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, file: DataFile) -> Result<T, StorageError> {
        let path = self.path_of(file);
        let content = fs::read_to_string(&path).map_err(|source| StorageError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| StorageError::Parse { path, source })
    }

    fn write_json<T: Serialize + ?Sized>(&self, file: DataFile, value: &T) -> Result<(), StorageError> {
        let path = self.path_of(file);
        let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Serialize {
            path: path.clone(),
            source,
        })?;

        let write_err = |source: std::io::Error| StorageError::Write {
            path: path.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.data_root).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        debug!(path = %path.display(), bytes = json.len(), "wrote collection");
        Ok(())
    }
}

impl Repository for JsonStore {
    fn load_categories(&self) -> Result<Vec<Category>, StorageError> {
        self.read_json(DataFile::Categories)
    }

    fn save_categories(&self, categories: &[Category]) -> Result<(), StorageError> {
        self.write_json(DataFile::Categories, categories)
    }

    fn load_bookmarks(&self) -> Result<Vec<Bookmark>, StorageError> {
        self.read_json(DataFile::Bookmarks)
    }

    fn save_bookmarks(&self, bookmarks: &[Bookmark]) -> Result<(), StorageError> {
        self.write_json(DataFile::Bookmarks, bookmarks)
    }

    fn load_settings(&self) -> Result<Settings, StorageError> {
        if !self.path_of(DataFile::Settings).exists() {
            return Ok(Settings::default());
        }
        self.read_json(DataFile::Settings)
    }

    fn save_settings(&self, settings: &Settings) -> Result<Settings, StorageError> {
        let mut stamped = settings.clone();
        stamped.updated_at = Some(timestamp::now());
        self.write_json(DataFile::Settings, &stamped)?;
        Ok(stamped)
    }

    /// Parses `users.json`, skipping the reserved secret key and any entry
    /// that is not a well-formed user.
    fn load_users(&self) -> Result<UserDirectory, StorageError> {
        let raw: serde_json::Map<String, Value> = self.read_json(DataFile::Users)?;
        let mut directory = UserDirectory::default();

        for (key, value) in raw {
            if key == SECRET_KEY_FIELD {
                directory.secret_key = value.as_str().unwrap_or_default().to_string();
                continue;
            }
            match serde_json::from_value::<User>(value) {
                Ok(user) => {
                    directory.users.insert(key, user);
                }
                Err(e) => warn!(user = %key, error = %e, "skipping malformed user entry"),
            }
        }
        Ok(directory)
    }
}
