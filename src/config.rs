//! Runtime configuration for navdesk.
//!
//! Values come from environment variables with hard-coded fallbacks, so the
//! binary runs with no setup against `./data`.

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the data root.
pub const DATA_DIR_ENV: &str = "NAVDESK_DATA_DIR";
/// Environment variable holding the `tracing` filter directive.
pub const LOG_ENV: &str = "NAVDESK_LOG";
/// Environment variable overriding the RPC rate limit.
pub const RATE_LIMIT_ENV: &str = "NAVDESK_RATE_LIMIT";

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_RATE_LIMIT: u32 = 200;
const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

/// Upload size cap (2 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// Resolved configuration shared by the app core and the RPC binary.
#[derive(Debug, Clone, PartialEq)]
pub struct NavdeskConfig {
    /// Directory holding the JSON files and the `uploads/` tree.
    pub data_root: PathBuf,
    pub max_upload_bytes: u64,
    pub rate_limit_per_second: u32,
    pub session_ttl_days: i64,
    pub log_filter: String,
}

impl Default for NavdeskConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_DIR),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            rate_limit_per_second: DEFAULT_RATE_LIMIT,
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl NavdeskConfig {
    /// Builds the configuration from the process environment.
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Default configuration rooted at `data_root`.
    pub fn with_data_root<P: AsRef<Path>>(data_root: P) -> Self {
        Self {
            data_root: data_root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            config.data_root = PathBuf::from(dir);
        }
        if let Some(filter) = lookup(LOG_ENV).filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }
        if let Some(limit) = lookup(RATE_LIMIT_ENV).and_then(|v| v.trim().parse().ok()) {
            config.rate_limit_per_second = limit;
        }
        config
    }

    /// Root of the managed icon tree.
    pub fn uploads_root(&self) -> PathBuf {
        self.data_root.join("uploads")
    }
}
