use super::fs_backend::FsBackend;
use super::snapshot_store::SnapshotStore;
use std::path::{Path, PathBuf};

/// Collection snapshot kept in a single JSON file.
pub type JsonFileStore = SnapshotStore<FsBackend>;

impl JsonFileStore {
    /// Nothing touches disk until the first write; a missing file reads as
    /// an empty collection.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        SnapshotStore::with_backend(FsBackend::new(path))
    }

    pub fn path(&self) -> &Path {
        self.backend.path()
    }
}
