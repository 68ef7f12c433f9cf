//! File-backed object store.
//!
//! The in-memory cache is the working copy; the JSON snapshot on disk is
//! rewritten in full after every mutation, so it never lags the cache once
//! an operation returns.

mod snapshot;

pub use snapshot::{decode_entry, encode, encode_object, EntryError};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::StorageConfig;
use crate::models::*;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt snapshot {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("unknown class: {0}")]
    UnknownClass(String),

    #[error("no instance found: {0}")]
    NotFound(String),

    #[error("attribute {0} is read-only")]
    ReservedAttribute(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub struct ObjectStore {
    path: PathBuf,
    registry: Registry,
    objects: Vec<StoredObject>,
    /// Composite key -> position in `objects`.
    index: HashMap<String, usize>,
}

impl ObjectStore {
    /// Open the store backed by `path` and load whatever snapshot is there.
    pub fn open(path: impl AsRef<Path>, registry: Registry) -> Result<Self> {
        let mut store = Self {
            path: path.as_ref().to_path_buf(),
            registry,
            objects: Vec::new(),
            index: HashMap::new(),
        };
        store.load()?;
        Ok(store)
    }

    pub fn with_config(config: &StorageConfig) -> Result<Self> {
        Self::open(&config.path, Registry::builtin())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Replace the cache with the contents of the snapshot file.
    ///
    /// A missing file is an empty store. An unreadable or malformed file is
    /// an error. Entries that cannot be rebuilt (unknown class, missing id)
    /// are skipped so one stale entry never blocks the rest. Returns the
    /// number of objects loaded.
    pub fn load(&mut self) -> Result<usize> {
        self.objects.clear();
        self.index.clear();

        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No snapshot yet, starting empty");
            return Ok(0);
        }

        let content = fs::read_to_string(&self.path).map_err(io_error(&self.path))?;
        if content.trim().is_empty() {
            return Ok(0);
        }

        let parsed: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        let serde_json::Value::Object(entries) = parsed else {
            return Err(StoreError::Corrupt {
                path: self.path.clone(),
                reason: "top level is not a JSON object".into(),
            });
        };

        let mut skipped = 0;
        for (key, entry) in &entries {
            match decode_entry(key, entry, &self.registry) {
                Ok(obj) => {
                    if obj.key() != *key {
                        tracing::warn!(
                            key = %key,
                            actual = %obj.key(),
                            "Snapshot key does not match object, re-keying"
                        );
                    }
                    self.insert(obj);
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(key = %key, error = %e, "Skipping snapshot entry");
                }
            }
        }

        tracing::info!(
            path = %self.path.display(),
            loaded = self.objects.len(),
            skipped,
            "Loaded snapshot"
        );
        Ok(self.objects.len())
    }

    /// Overwrite the snapshot with the full cache.
    ///
    /// Writes a sibling temporary file, then renames it over the target.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }

        let json = serde_json::to_string_pretty(&encode(&self.objects))?;

        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        fs::write(&tmp_path, json).map_err(io_error(&tmp_path))?;
        fs::rename(&tmp_path, &self.path).map_err(io_error(&self.path))?;

        tracing::debug!(
            path = %self.path.display(),
            objects = self.objects.len(),
            "Saved snapshot"
        );
        Ok(())
    }

    /// Every live object in insertion order, optionally limited to one class.
    pub fn all(&self, class_filter: Option<&str>) -> Vec<&StoredObject> {
        self.objects
            .iter()
            .filter(|obj| class_filter.map_or(true, |class| obj.class_name() == class))
            .collect()
    }

    pub fn count(&self, class_filter: Option<&str>) -> usize {
        match class_filter {
            None => self.objects.len(),
            Some(class) => self
                .objects
                .iter()
                .filter(|obj| obj.class_name() == class)
                .count(),
        }
    }

    pub fn get(&self, class_name: &str, id: &str) -> Option<&StoredObject> {
        self.index
            .get(&composite_key(class_name, id))
            .map(|&pos| &self.objects[pos])
    }

    /// Allocate a new instance of `class_name` and persist it.
    ///
    /// If the snapshot cannot be written the instance is dropped again.
    pub fn create(&mut self, class_name: &str) -> Result<&StoredObject> {
        let class = self
            .registry
            .resolve(class_name)
            .ok_or_else(|| StoreError::UnknownClass(class_name.to_string()))?;
        let obj = class.instantiate();
        let key = obj.key();
        tracing::debug!(key = %key, "Created object");

        let pos = self.insert(obj);
        if let Err(e) = self.save() {
            self.objects.truncate(pos);
            self.index.remove(&key);
            return Err(e);
        }
        Ok(&self.objects[pos])
    }

    /// Set one attribute on an existing object and persist.
    pub fn set_attribute(
        &mut self,
        class_name: &str,
        id: &str,
        key: &str,
        value: Value,
    ) -> Result<()> {
        self.set_attributes(class_name, id, vec![(key.to_string(), value)])
    }

    /// Set several attributes in order, then persist once.
    ///
    /// Every name is checked before anything changes. If the snapshot cannot
    /// be written the object is restored to its previous state.
    pub fn set_attributes(
        &mut self,
        class_name: &str,
        id: &str,
        pairs: Vec<(String, Value)>,
    ) -> Result<()> {
        if let Some((key, _)) = pairs.iter().find(|(key, _)| is_reserved(key)) {
            return Err(StoreError::ReservedAttribute(key.clone()));
        }
        let composite = composite_key(class_name, id);
        let pos = *self
            .index
            .get(&composite)
            .ok_or(StoreError::NotFound(composite))?;

        let previous = self.objects[pos].clone();
        for (key, value) in pairs {
            self.objects[pos].set(key, value);
        }
        if let Err(e) = self.save() {
            self.objects[pos] = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Remove an object. Persists only when something was removed.
    ///
    /// If the snapshot cannot be written the object is put back in place.
    pub fn delete(&mut self, class_name: &str, id: &str) -> Result<bool> {
        let Some(&pos) = self.index.get(&composite_key(class_name, id)) else {
            return Ok(false);
        };

        let removed = self.objects.remove(pos);
        self.reindex();

        if let Err(e) = self.save() {
            self.objects.insert(pos, removed);
            self.reindex();
            return Err(e);
        }
        Ok(true)
    }

    fn reindex(&mut self) {
        self.index = self
            .objects
            .iter()
            .enumerate()
            .map(|(pos, obj)| (obj.key(), pos))
            .collect();
    }

    /// Insert under the object's composite key, replacing any previous holder
    /// of that key in place.
    fn insert(&mut self, obj: StoredObject) -> usize {
        let key = obj.key();
        if let Some(&pos) = self.index.get(&key) {
            self.objects[pos] = obj;
            return pos;
        }
        let pos = self.objects.len();
        self.objects.push(obj);
        self.index.insert(key, pos);
        pos
    }
}
