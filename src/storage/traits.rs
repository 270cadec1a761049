//! Abstract storage trait for the persisted name snapshot.
//!
//! The snapshot is a flat lower-cased-identifier to display-name mapping,
//! serialized as one JSON document under a fixed key. Persistence is
//! best-effort by contract: the resolver swallows every storage error, so a
//! backend may fail freely without affecting resolution results.

use std::collections::HashMap;

use thiserror::Error;

/// Errors that can occur during snapshot load or save.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing medium could not be read or written.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document is not a valid flat string-to-string mapping.
    #[error("snapshot is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Backend-specific failure.
    #[error("snapshot backend error: {0}")]
    Backend(String),
}

/// A persistent store for the name-cache snapshot.
///
/// `load` is called at most once per resolver lifetime; `save` is called from
/// the debounced flush task with a full copy of the cache. Both are
/// synchronous: snapshots are small (one short string pair per Pokémon ever
/// resolved) and backends are local.
pub trait SnapshotStore: Send + Sync {
    /// Reads the stored snapshot.
    ///
    /// A missing snapshot is not an error - it loads as an empty mapping.
    ///
    /// # Errors
    /// Returns an error for an unreadable or corrupt document. Callers treat
    /// that the same as a missing snapshot.
    fn load(&self) -> Result<HashMap<String, String>, StorageError>;

    /// Replaces the stored snapshot with `entries`.
    ///
    /// # Errors
    /// Returns an error when the document cannot be written (e.g. quota or
    /// permissions). Callers ignore it; the next flush retries from scratch.
    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StorageError>;
}
