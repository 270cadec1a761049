//! Snapshot persistence for the name cache.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileSnapshotStore;
pub use memory::InMemorySnapshotStore;
pub use traits::{SnapshotStore, StorageError};
