use crate::error::Result;
use crate::model::Collectible;
use std::path::PathBuf;

/// Raw I/O for whole-collection snapshots.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while SnapshotStore handles the "what" (contract semantics, locking).
pub trait SnapshotBackend: Send + Sync {
    /// Load the full collection.
    /// Returns an empty list if nothing has been saved yet.
    fn load(&self) -> Result<Vec<Collectible>>;

    /// Replace the full collection.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn save(&self, items: &[Collectible]) -> Result<()>;

    /// Where the snapshot lives. For MemBackend, a virtual path.
    fn location(&self) -> PathBuf;
}
