//! Storage configuration.
//!
//! Resolved from the environment, overridable from the command line:
//! - `HBNB_FILE` - path of the JSON snapshot (default: `file.json`)

use std::path::PathBuf;

/// Snapshot file used when nothing else is configured.
pub const DEFAULT_FILE: &str = "file.json";

/// Environment variable naming the snapshot file.
pub const FILE_ENV: &str = "HBNB_FILE";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    /// Path of the JSON snapshot backing the store.
    pub path: PathBuf,
}

impl StorageConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let path = std::env::var_os(FILE_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE));
        Self { path }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FILE)
    }
}
