//! In-memory snapshot backend.
//!
//! This is the backend for execution contexts without persistent storage,
//! where persistence degrades to a no-op beyond the process lifetime. It is
//! also the reference backend for tests.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::storage::traits::{SnapshotStore, StorageError};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

/// Snapshot store backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemorySnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with `entries`, as if a snapshot had been
    /// persisted by an earlier session.
    #[must_use]
    pub fn with_entries(entries: HashMap<String, String>) -> Self {
        Self { entries: RwLock::new(entries) }
    }

    /// Returns a copy of the current contents.
    ///
    /// # Errors
    /// Returns [`StorageError::Backend`] if the lock is poisoned.
    pub fn contents(&self) -> Result<HashMap<String, String>, StorageError> {
        Ok(self.entries.read().map_err(|_| lock_err("contents"))?.clone())
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        Ok(self.entries.read().map_err(|_| lock_err("load"))?.clone())
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        *self.entries.write().map_err(|_| lock_err("save"))? = entries.clone();
        Ok(())
    }
}
