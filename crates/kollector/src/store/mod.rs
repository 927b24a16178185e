//! # Storage Layer
//!
//! This module defines the on-device cache of the user's collection. The
//! [`LocalStore`] trait is the one contract every backend satisfies; the
//! repository only ever talks to the trait.
//!
//! ## Backends
//!
//! Two structurally different stores, same behavior:
//!
//! 1. **Snapshot store** ([`snapshot_store::SnapshotStore`]): the whole collection
//!    is one document. Every mutation is load → modify → save of the full set.
//!    - [`fs::JsonFileStore`]: a JSON file, rewritten atomically (tmp + rename).
//!    - [`memory::InMemoryStore`]: same logic over a `Vec`, for tests.
//! 2. **Record store** ([`sqlite::SqliteStore`]): one row per collectible, array
//!    fields kept as JSON text columns. Every mutation is one transaction.
//!
//! Pick one at construction time (see [`open_store`]) and inject it.
//!
//! ## Contract
//!
//! | Operation        | Present id                  | Absent id      |
//! |------------------|-----------------------------|----------------|
//! | `add_many`       | skipped (never overwritten) | inserted       |
//! | `update`         | replaced wholesale          | no-op          |
//! | `update_gallery` | only the gallery replaced   | no-op          |
//! | `delete`         | removed                     | no-op          |
//! | `get`            | `Some(item)`                | `None`         |
//!
//! `fetch_all` returns items in insertion order and returns an empty list for
//! a store that was never written.
//!
//! ### Backfill, not merge
//!
//! `add_many` is upsert-by-absence. It exists so remote results can be written
//! into the cache without clobbering anything the user edited locally, and so
//! two racing backfills can never produce duplicates.
//!
//! ## Consistency
//!
//! Writes on one store instance are serialized. Readers see either the state
//! before a write or the state after it, never a half-applied one. A mutation
//! that changes nothing does not touch disk.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── collectibles.json     # JsonFileStore: array of Collectible
//! └── collectibles.sqlite   # SqliteStore: table `collectibles`
//! ```

use crate::config::{BackendKind, KollectorConfig};
use crate::error::{KollectorError, Result};
use crate::model::Collectible;
use std::fs as std_fs;
use std::sync::Arc;

pub mod backend;
pub mod fs;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;
pub mod snapshot_store;
pub mod sqlite;

/// Durable on-device storage of the collectible set.
pub trait LocalStore: Send + Sync {
    /// Every stored item. Empty (not an error) when nothing was ever written.
    fn fetch_all(&self) -> Result<Vec<Collectible>>;

    /// The item with this id, if any.
    fn get(&self, id: &str) -> Result<Option<Collectible>>;

    /// Insert every item whose id is not yet stored; skip the rest.
    /// Returns how many were inserted.
    fn add_many(&self, items: &[Collectible]) -> Result<usize>;

    /// Replace the record at `item.id`. No-op when absent, which includes a
    /// blank id since `add_many` never stores one.
    fn update(&self, item: &Collectible) -> Result<()>;

    /// Replace only the gallery of the record at `id`. No-op when absent.
    fn update_gallery(&self, id: &str, images: &[String]) -> Result<()>;

    /// Remove the record at `id`. No-op when absent.
    fn delete(&self, id: &str) -> Result<()>;

    fn contains(&self, item: &Collectible) -> Result<bool> {
        Ok(self.get(&item.id)?.is_some())
    }

    /// Remove every record, leaving an empty but usable store.
    fn clear(&self) -> Result<()>;
}

impl<T: LocalStore + ?Sized> LocalStore for Box<T> {
    fn fetch_all(&self) -> Result<Vec<Collectible>> {
        (**self).fetch_all()
    }
    fn get(&self, id: &str) -> Result<Option<Collectible>> {
        (**self).get(id)
    }
    fn add_many(&self, items: &[Collectible]) -> Result<usize> {
        (**self).add_many(items)
    }
    fn update(&self, item: &Collectible) -> Result<()> {
        (**self).update(item)
    }
    fn update_gallery(&self, id: &str, images: &[String]) -> Result<()> {
        (**self).update_gallery(id, images)
    }
    fn delete(&self, id: &str) -> Result<()> {
        (**self).delete(id)
    }
    fn contains(&self, item: &Collectible) -> Result<bool> {
        (**self).contains(item)
    }
    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

impl<T: LocalStore + ?Sized> LocalStore for Arc<T> {
    fn fetch_all(&self) -> Result<Vec<Collectible>> {
        (**self).fetch_all()
    }
    fn get(&self, id: &str) -> Result<Option<Collectible>> {
        (**self).get(id)
    }
    fn add_many(&self, items: &[Collectible]) -> Result<usize> {
        (**self).add_many(items)
    }
    fn update(&self, item: &Collectible) -> Result<()> {
        (**self).update(item)
    }
    fn update_gallery(&self, id: &str, images: &[String]) -> Result<()> {
        (**self).update_gallery(id, images)
    }
    fn delete(&self, id: &str) -> Result<()> {
        (**self).delete(id)
    }
    fn contains(&self, item: &Collectible) -> Result<bool> {
        (**self).contains(item)
    }
    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// Rejects records that would break the primary-key invariant.
pub(crate) fn validate(item: &Collectible) -> Result<()> {
    if item.id.trim().is_empty() {
        tracing::warn!(name = %item.attributes.name, "rejecting collectible with empty id");
        return Err(KollectorError::InvalidCollectible(format!(
            "empty id (name: {:?})",
            item.attributes.name
        )));
    }
    Ok(())
}

/// Opens the backend selected by `config` under its data directory.
pub fn open_store(config: &KollectorConfig) -> Result<Box<dyn LocalStore>> {
    let dir = config.data_dir()?;
    std_fs::create_dir_all(&dir)?;

    let store: Box<dyn LocalStore> = match config.backend {
        BackendKind::Json => Box::new(fs::JsonFileStore::open(dir.join(&config.json_file))),
        BackendKind::Sqlite => Box::new(sqlite::SqliteStore::open(dir.join(&config.sqlite_file))?),
    };
    tracing::debug!(backend = ?config.backend, dir = %dir.display(), "opened local store");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, backend: BackendKind) -> KollectorConfig {
        KollectorConfig {
            backend,
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_json_store_from_config() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&config_in(&dir, BackendKind::Json)).unwrap();

        store.add_many(&[Collectible::new("a", "A")]).unwrap();
        assert!(dir.path().join("collectibles.json").exists());
    }

    #[test]
    fn test_open_sqlite_store_from_config() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&config_in(&dir, BackendKind::Sqlite)).unwrap();

        store.add_many(&[Collectible::new("a", "A")]).unwrap();
        assert!(dir.path().join("collectibles.sqlite").exists());
        assert_eq!(store.fetch_all().unwrap().len(), 1);
    }

    #[test]
    fn test_validate_rejects_blank_id() {
        let err = validate(&Collectible::new("  ", "Nameless")).unwrap_err();
        assert!(matches!(err, KollectorError::InvalidCollectible(_)));
        assert!(validate(&Collectible::new("x", "Named")).is_ok());
    }
}
