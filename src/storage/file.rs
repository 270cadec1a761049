//! File-backed snapshot backend.
//!
//! The snapshot lives in a single JSON document at
//! `<dir>/jp-name-cache-v1.json`. Writes go through a temp file in the same
//! directory followed by a rename, so a crash mid-write leaves the previous
//! snapshot intact rather than a truncated document.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::storage::traits::{SnapshotStore, StorageError};

/// Fixed storage key of the snapshot document. Bump the suffix when the
/// on-disk shape changes.
pub const SNAPSHOT_KEY: &str = "jp-name-cache-v1";

/// Snapshot store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an error when the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self { path: dir.join(format!("{SNAPSHOT_KEY}.json")) })
    }

    /// Path of the snapshot document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(err) => return Err(err.into()),
        };

        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let doc = serde_json::to_string(entries)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, doc)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
