use super::backend::SnapshotBackend;
use super::{validate, LocalStore};
use crate::error::{KollectorError, Result};
use crate::model::Collectible;
use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Whole-collection store: every mutation loads the snapshot, edits it and
/// saves it back in one piece.
pub struct SnapshotStore<B: SnapshotBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    /// Serializes load-modify-save cycles. Readers share it.
    lock: RwLock<()>,
}

impl<B: SnapshotBackend> SnapshotStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            lock: RwLock::new(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, ()>> {
        self.lock
            .read()
            .map_err(|_| KollectorError::Store("snapshot lock poisoned".to_string()))
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, ()>> {
        self.lock
            .write()
            .map_err(|_| KollectorError::Store("snapshot lock poisoned".to_string()))
    }

    /// Runs `edit` on the loaded snapshot and saves only if it reports a change.
    fn mutate<F>(&self, edit: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<Collectible>) -> bool,
    {
        let _guard = self.write_guard()?;
        let mut items = self.backend.load()?;
        let changed = edit(&mut items);
        if changed {
            self.backend.save(&items)?;
        }
        Ok(changed)
    }
}

impl<B: SnapshotBackend> LocalStore for SnapshotStore<B> {
    fn fetch_all(&self) -> Result<Vec<Collectible>> {
        let _guard = self.read_guard()?;
        self.backend.load()
    }

    fn get(&self, id: &str) -> Result<Option<Collectible>> {
        let _guard = self.read_guard()?;
        Ok(self.backend.load()?.into_iter().find(|item| item.id == id))
    }

    fn add_many(&self, new_items: &[Collectible]) -> Result<usize> {
        for item in new_items {
            validate(item)?;
        }

        let mut inserted = 0;
        self.mutate(|items| {
            let mut known: HashSet<String> = items.iter().map(|i| i.id.clone()).collect();
            for item in new_items {
                if known.insert(item.id.clone()) {
                    items.push(item.clone());
                    inserted += 1;
                }
            }
            inserted > 0
        })?;

        debug!(
            location = %self.backend.location().display(),
            offered = new_items.len(),
            inserted,
            "add_many"
        );
        Ok(inserted)
    }

    fn update(&self, item: &Collectible) -> Result<()> {
        let changed = self.mutate(|items| match items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => {
                *existing = item.clone();
                true
            }
            None => false,
        })?;
        debug!(id = %item.id, changed, "update");
        Ok(())
    }

    fn update_gallery(&self, id: &str, images: &[String]) -> Result<()> {
        let changed = self.mutate(|items| match items.iter_mut().find(|i| i.id == id) {
            Some(existing) => {
                existing.attributes.images.gallery = images.to_vec();
                true
            }
            None => false,
        })?;
        debug!(id, changed, "update_gallery");
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let changed = self.mutate(|items| {
            let before = items.len();
            items.retain(|i| i.id != id);
            items.len() != before
        })?;
        debug!(id, changed, "delete");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.write_guard()?;
        self.backend.save(&[])?;
        debug!(location = %self.backend.location().display(), "cleared");
        Ok(())
    }
}
