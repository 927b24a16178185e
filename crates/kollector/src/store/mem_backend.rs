use super::backend::SnapshotBackend;
use crate::error::{KollectorError, Result};
use crate::model::Collectible;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

/// In-memory snapshot backend for testing.
///
/// Uses a `RwLock` so the backend stays `Send + Sync` like the on-disk one;
/// the store above it does its own write serialization.
#[derive(Default)]
pub struct MemBackend {
    items: RwLock<Vec<Collectible>>,
    simulate_write_error: AtomicBool,
    saves: AtomicUsize,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SnapshotBackend for MemBackend {
    fn load(&self) -> Result<Vec<Collectible>> {
        let items = self
            .items
            .read()
            .map_err(|_| KollectorError::Store("memory snapshot lock poisoned".to_string()))?;
        Ok(items.clone())
    }

    fn save(&self, new_items: &[Collectible]) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(KollectorError::Store("Simulated write error".to_string()));
        }
        let mut items = self
            .items
            .write()
            .map_err(|_| KollectorError::Store("memory snapshot lock poisoned".to_string()))?;
        *items = new_items.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("memory://collectibles")
    }
}
