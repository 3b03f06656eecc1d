//! Asset Manager for navdesk.
//!
//! Owns the `uploads/<dir>/<file>` tree that backs local icon references.
//! Housekeeping here is best-effort: the JSON record is the source of truth,
//! and every filesystem failure is logged and degrades to "keep the old value"
//! or "do nothing" instead of failing the enclosing mutation.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::generate_id;
use crate::config::NavdeskConfig;
use crate::types::bookmark::{Bookmark, DEFAULT_ICON};
use crate::types::category::{Category, ALL_CATEGORY_ID, COMMON_UPLOAD_DIR};
use crate::types::errors::{AssetError, EntityKind, NavError, StorageError, ValidationReason};

/// Prefix shared by every local asset reference.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// Subdirectory holding the site favicon.
pub const FAVICON_DIR: &str = "favicon";
const FAVICON_FILE: &str = "favicon.ico";

/// Image extensions accepted for uploads (compared case-insensitively).
pub const ALLOWED_ICON_EXTENSIONS: [&str; 7] = ["jpeg", "jpg", "png", "gif", "svg", "ico", "webp"];

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedIcon {
    pub url: String,
    pub filename: String,
    #[serde(rename = "originalname")]
    pub original_name: String,
    pub size: u64,
}

/// Returns true when `icon_ref` points into the managed uploads tree.
pub fn is_local_ref(icon_ref: &str) -> bool {
    icon_ref.starts_with(UPLOADS_PREFIX)
}

/// True for a non-empty single path component that cannot escape its parent.
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains('/')
        && !segment.contains('\\')
}

/// Splits `/uploads/<dir>/<file>` into `(dir, file)`.
fn parse_local_ref(icon_ref: &str) -> Result<(&str, &str), AssetError> {
    let rest = icon_ref
        .strip_prefix(UPLOADS_PREFIX)
        .ok_or_else(|| AssetError::MalformedReference(icon_ref.to_string()))?;
    match rest.split_once('/') {
        Some((dir, file)) if is_safe_segment(dir) && is_safe_segment(file) => Ok((dir, file)),
        _ => Err(AssetError::MalformedReference(icon_ref.to_string())),
    }
}

fn local_ref(dir: &str, file: &str) -> String {
    format!("{}{}/{}", UPLOADS_PREFIX, dir, file)
}

/// Manages icon files under `<data_root>/uploads`.
#[derive(Debug, Clone)]
pub struct AssetManager {
    uploads_root: PathBuf,
    max_upload_bytes: u64,
}

impl AssetManager {
    pub fn new(config: &NavdeskConfig) -> Self {
        Self {
            uploads_root: config.uploads_root(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn uploads_root(&self) -> &Path {
        &self.uploads_root
    }

    /// Physical path of a local reference, or `None` for anything else.
    pub fn local_path(&self, icon_ref: &str) -> Option<PathBuf> {
        parse_local_ref(icon_ref)
            .ok()
            .map(|(dir, file)| self.uploads_root.join(dir).join(file))
    }

    /// The upload directory of `category_id`, or `"common"` for an unknown id
    /// or the `"all"` sentinel.
    pub fn resolve_upload_dir(&self, category_id: &str, categories: &[Category]) -> String {
        if category_id == ALL_CATEGORY_ID {
            return COMMON_UPLOAD_DIR.to_string();
        }
        categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.upload_dir.clone())
            .unwrap_or_else(|| COMMON_UPLOAD_DIR.to_string())
    }

    /// Relocates a local icon into the new category's upload directory and
    /// returns the rewritten reference.
    ///
    /// Non-local or malformed references come back unchanged. When the source
    /// file is already gone, the rewritten reference is returned without
    /// touching the filesystem. A failed move keeps the old reference.
    pub fn move_icon(
        &self,
        old_ref: &str,
        old_category_id: &str,
        new_category_id: &str,
        categories: &[Category],
    ) -> String {
        if !is_local_ref(old_ref) {
            return old_ref.to_string();
        }
        let (old_dir, file) = match parse_local_ref(old_ref) {
            Ok(parts) => parts,
            Err(e) => {
                warn!(error = %e, "icon not moved");
                return old_ref.to_string();
            }
        };

        let new_dir = self.resolve_upload_dir(new_category_id, categories);
        let new_ref = local_ref(&new_dir, file);
        let source = self.uploads_root.join(old_dir).join(file);

        if !source.exists() {
            warn!(
                path = %source.display(),
                from = old_category_id,
                to = new_category_id,
                "icon file missing, rewriting reference only"
            );
            return new_ref;
        }

        let dest_dir = self.uploads_root.join(&new_dir);
        let dest = dest_dir.join(file);
        match Self::relocate(&source, &dest_dir, &dest) {
            Ok(()) => {
                info!(from = %source.display(), to = %dest.display(), "icon moved");
                new_ref
            }
            Err(e) => {
                warn!(error = %e, "icon move failed, keeping old reference");
                old_ref.to_string()
            }
        }
    }

    fn relocate(from: &Path, dest_dir: &Path, dest: &Path) -> Result<(), AssetError> {
        fs::create_dir_all(dest_dir).map_err(|source| AssetError::Io {
            path: dest_dir.to_path_buf(),
            source,
        })?;
        fs::rename(from, dest).map_err(|source| AssetError::Io {
            path: from.to_path_buf(),
            source,
        })
    }

    /// Removes the file behind a local reference. No-op for empty or external
    /// references; a missing file is ignored.
    pub fn delete_icon_if_local(&self, icon_ref: &str) {
        if icon_ref.is_empty() || !is_local_ref(icon_ref) {
            return;
        }
        let path = match self.local_path(icon_ref) {
            Some(path) => path,
            None => {
                warn!(icon = icon_ref, "malformed icon reference, nothing deleted");
                return;
            }
        };
        match fs::remove_file(&path) {
            Ok(()) => info!(path = %path.display(), "icon file deleted"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "icon file already absent")
            }
            Err(e) => warn!(path = %path.display(), error = %e, "icon delete failed"),
        }
    }

    /// Creates `uploads/<dir>` if needed. Failures are logged only.
    pub fn ensure_upload_dir(&self, dir: &str) {
        if !is_safe_segment(dir) {
            warn!(dir, "refusing to create unsafe upload directory");
            return;
        }
        let path = self.uploads_root.join(dir);
        if let Err(e) = fs::create_dir_all(&path) {
            warn!(path = %path.display(), error = %e, "upload directory not created");
        }
    }

    /// Recursively removes `uploads/<dir>`. Failures are logged only.
    pub fn remove_upload_dir(&self, dir: &str) {
        if !is_safe_segment(dir) {
            warn!(dir, "refusing to remove unsafe upload directory");
            return;
        }
        let path = self.uploads_root.join(dir);
        match fs::remove_dir_all(&path) {
            Ok(()) => info!(path = %path.display(), "upload directory removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "upload directory removal failed"),
        }
    }

    /// Checks the extension allow-list and size cap, returning the original
    /// extension (case preserved) with its leading dot.
    fn validate_upload(&self, original_name: &str, size: u64) -> Result<String, NavError> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if !ALLOWED_ICON_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
            return Err(ValidationReason::UnsupportedFileType(original_name.to_string()).into());
        }
        if size > self.max_upload_bytes {
            return Err(ValidationReason::FileTooLarge {
                size,
                limit: self.max_upload_bytes,
            }
            .into());
        }
        Ok(format!(".{}", ext))
    }

    fn write_asset(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), NavError> {
        fs::create_dir_all(dir).map_err(|source| StorageError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        if let Err(source) = fs::write(path, bytes) {
            let _ = fs::remove_file(path);
            return Err(StorageError::Write {
                path: path.to_path_buf(),
                source,
            }
            .into());
        }
        Ok(())
    }

    /// Stores an uploaded icon in the category's upload directory.
    ///
    /// `old_icon`, when local, is deleted first: a later same-category
    /// bookmark update relies on this.
    pub fn store_icon(
        &self,
        category_id: &str,
        original_name: &str,
        bytes: &[u8],
        old_icon: Option<&str>,
        categories: &[Category],
    ) -> Result<UploadedIcon, NavError> {
        let size = bytes.len() as u64;
        let ext = self.validate_upload(original_name, size)?;

        if let Some(old) = old_icon {
            self.delete_icon_if_local(old);
        }

        let dir = self.resolve_upload_dir(category_id, categories);
        let filename = format!("{}{}", generate_id("icon"), ext);
        let dir_path = self.uploads_root.join(&dir);
        Self::write_asset(&dir_path, &dir_path.join(&filename), bytes)?;

        let url = local_ref(&dir, &filename);
        info!(original = original_name, url = %url, size_kb = size / 1024, "icon uploaded");
        Ok(UploadedIcon {
            url,
            filename,
            original_name: original_name.to_string(),
            size,
        })
    }

    /// Replaces the site favicon, served as `/favicon.ico`.
    pub fn store_favicon(&self, original_name: &str, bytes: &[u8]) -> Result<UploadedIcon, NavError> {
        let size = bytes.len() as u64;
        self.validate_upload(original_name, size)?;

        let dir_path = self.uploads_root.join(FAVICON_DIR);
        Self::write_asset(&dir_path, &dir_path.join(FAVICON_FILE), bytes)?;

        info!(original = original_name, size_kb = size / 1024, "favicon updated");
        Ok(UploadedIcon {
            url: DEFAULT_ICON.to_string(),
            filename: FAVICON_FILE.to_string(),
            original_name: original_name.to_string(),
            size,
        })
    }

    fn asset_path(&self, icon_ref: &str) -> Option<PathBuf> {
        if icon_ref == DEFAULT_ICON {
            return Some(self.uploads_root.join(FAVICON_DIR).join(FAVICON_FILE));
        }
        self.local_path(icon_ref)
    }

    /// Reads the bytes behind a local reference or `/favicon.ico`.
    ///
    /// A dangling or external reference is `NotFound`, not a storage error.
    pub fn read_asset(&self, icon_ref: &str) -> Result<Vec<u8>, NavError> {
        let path = self
            .asset_path(icon_ref)
            .ok_or_else(|| NavError::not_found(EntityKind::Asset, icon_ref))?;
        fs::read(&path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "asset not readable");
            NavError::not_found(EntityKind::Asset, icon_ref)
        })
    }

    /// The reference a page should render: `/favicon.ico` for an empty
    /// reference or a local one whose file is gone.
    pub fn display_icon(&self, icon_ref: &str) -> String {
        if icon_ref.is_empty() {
            return DEFAULT_ICON.to_string();
        }
        if !is_local_ref(icon_ref) {
            return icon_ref.to_string();
        }
        match self.local_path(icon_ref) {
            Some(path) if path.is_file() => icon_ref.to_string(),
            _ => DEFAULT_ICON.to_string(),
        }
    }

    /// Files under `uploads/` (favicon excluded) that no bookmark references.
    ///
    /// Read-only; callers decide whether to delete what it reports.
    pub fn find_orphans(&self, bookmarks: &[Bookmark]) -> Vec<String> {
        let referenced: BTreeSet<&str> = bookmarks
            .iter()
            .map(|b| b.icon.as_str())
            .filter(|icon| is_local_ref(icon))
            .collect();

        let dirs = match fs::read_dir(&self.uploads_root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.uploads_root.display(), error = %e, "uploads root not readable");
                return Vec::new();
            }
        };

        let mut orphans = Vec::new();
        for dir in dirs.flatten() {
            let dir_name = dir.file_name().to_string_lossy().to_string();
            if dir_name == FAVICON_DIR || !dir.path().is_dir() {
                continue;
            }
            let files = match fs::read_dir(dir.path()) {
                Ok(files) => files,
                Err(e) => {
                    warn!(dir = %dir_name, error = %e, "upload directory not readable");
                    continue;
                }
            };
            for file in files.flatten() {
                if !file.path().is_file() {
                    continue;
                }
                let reference = local_ref(&dir_name, &file.file_name().to_string_lossy());
                if !referenced.contains(reference.as_str()) {
                    orphans.push(reference);
                }
            }
        }
        orphans.sort();
        orphans
    }
}
