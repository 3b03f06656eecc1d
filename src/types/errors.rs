use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// === StorageError ===

/// Errors raised while reading or writing a JSON data file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The file could not be read (missing, unreadable).
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file was read but is not valid JSON for the expected shape.
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The collection could not be encoded.
    #[error("Failed to serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The encoded collection could not be written to disk.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// === AssetError ===

/// Errors raised by best-effort icon file housekeeping.
///
/// These are logged and never surface from a lifecycle operation.
#[derive(Debug, Error)]
pub enum AssetError {
    /// A filesystem call on an asset path failed.
    #[error("Asset I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The reference does not have the `/uploads/<dir>/<file>` shape.
    #[error("Malformed asset reference: {0}")]
    MalformedReference(String),
}

// === ValidationReason ===

/// Why a create/update request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationReason {
    #[error("invalid URL: {0}")]
    BadUrl(String),
    #[error("name already exists: {0}")]
    DuplicateName(String),
    #[error("upload directory already exists: {0}")]
    DuplicateUploadDir(String),
    #[error("upload directory must be a single path segment: {0}")]
    InvalidUploadDir(String),
    #[error("category does not exist: {0}")]
    UnknownCategory(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("value out of range: {0}")]
    OutOfRange(String),
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("file exceeds {limit} bytes: {size}")]
    FileTooLarge { size: u64, limit: u64 },
}

// === EntityKind ===

/// The kind of record a `NotFound` error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Category,
    Bookmark,
    Asset,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Category => write!(f, "Category"),
            EntityKind::Bookmark => write!(f, "Bookmark"),
            EntityKind::Asset => write!(f, "Asset"),
        }
    }
}

// === NavError ===

/// Errors returned by lifecycle, settings and identity operations.
#[derive(Debug, Error)]
pub enum NavError {
    /// The request was rejected before anything was written.
    #[error("Validation failed: {0}")]
    Validation(ValidationReason),
    /// The referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    /// The operation is never allowed on this target.
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// Credentials or session token were not accepted.
    #[error("Unauthorized")]
    Unauthorized,
    /// A data file could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl NavError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        NavError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Message safe to hand to a remote caller.
    ///
    /// Storage details stay in the logs; every other variant is reported as is.
    pub fn public_message(&self) -> String {
        match self {
            NavError::Storage(_) => "internal storage error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ValidationReason> for NavError {
    fn from(reason: ValidationReason) -> Self {
        NavError::Validation(reason)
    }
}
