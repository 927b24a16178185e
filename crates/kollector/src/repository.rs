//! # Collectible Repository
//!
//! The repository is the one entry point callers use for the collection. It
//! decides when the local cache is good enough and when to go to the remote,
//! and it funnels every mutation into the local store.
//!
//! ## Read Path
//!
//! ```text
//! get_collectibles()
//!   ├─ local non-empty ──────────────► return local      (remote never called)
//!   └─ local empty
//!        ├─ no current user ─────────► NotAuthenticated  (nothing written)
//!        └─ user u
//!             ├─ [single-flight] wait for u's gate, re-check local
//!             ├─ remote.fetch_collectibles(u)
//!             ├─ local.add_many(fetched)   (backfill, never overwrites)
//!             └─ return fetched
//! ```
//!
//! The result of a backfill is what the remote returned, not a re-read of the
//! store. Since backfill only runs against an empty store the two agree,
//! except for duplicate ids inside the remote payload (the store keeps the
//! first one).
//!
//! ## Write Path
//!
//! `add_items`, `update_item`, `update_gallery`, `delete_item` and
//! `clear_database` go straight to the local store. The remote is read-only.
//!
//! ## Refresh
//!
//! `refresh_collectibles` fetches first and only then clears and refills the
//! store, so a failed fetch leaves the cache as it was.
//!
//! ## Concurrency
//!
//! Two `get_collectibles` calls racing on an empty store would both fetch.
//! Upsert-by-absence keeps that safe; the single-flight gate (on by default,
//! keyed on user id) also keeps it to one fetch.
//!
//! ## Errors
//!
//! Nothing is retried or swallowed. Store failures, remote failures and a
//! missing user all reach the caller as-is. In particular a backfill write
//! failure is returned even though the remote data was fetched.

use crate::config::KollectorConfig;
use crate::error::{KollectorError, Result};
use crate::model::Collectible;
use crate::remote::RemoteDataSource;
use crate::store::LocalStore;
use crate::user::UserContextProvider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info};

/// One async gate per user id.
///
/// A gate lives in the map only while some call holds or waits on it. The
/// last [`Flight`] to leave removes it, so the map does not grow with every
/// user id the process has seen.
#[derive(Default)]
struct SingleFlight {
    gates: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SingleFlight {
    async fn enter(&self, user_id: &str) -> Flight<'_> {
        // Gates are only cloned while the map is locked, which is what lets
        // `Flight::drop` trust the strong count.
        let gate = {
            let mut gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
            gates.entry(user_id.to_string()).or_default().clone()
        };
        let guard = gate.clone().lock_owned().await;
        Flight {
            flights: self,
            user_id: user_id.to_string(),
            gate,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn gate_count(&self) -> usize {
        self.gates.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Held for the duration of one gated backfill or refresh.
struct Flight<'a> {
    flights: &'a SingleFlight,
    user_id: String,
    gate: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut gates = self.flights.gates.lock().unwrap_or_else(|e| e.into_inner());
        // The map and this flight are the only owners: nobody else is waiting.
        if Arc::strong_count(&self.gate) == 2 {
            gates.remove(&self.user_id);
        }
    }
}

pub struct CollectibleRepository<S, R, U>
where
    S: LocalStore,
    R: RemoteDataSource,
    U: UserContextProvider,
{
    store: S,
    remote: R,
    users: U,
    flights: Option<SingleFlight>,
}

impl<S, R, U> CollectibleRepository<S, R, U>
where
    S: LocalStore,
    R: RemoteDataSource,
    U: UserContextProvider,
{
    pub fn new(store: S, remote: R, users: U) -> Self {
        Self {
            store,
            remote,
            users,
            flights: Some(SingleFlight::default()),
        }
    }

    /// Like [`CollectibleRepository::new`], with the repository settings
    /// taken from `config`.
    pub fn from_config(store: S, remote: R, users: U, config: &KollectorConfig) -> Self {
        Self::new(store, remote, users).with_single_flight(config.single_flight)
    }

    /// Turn the per-user backfill gate on or off.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.flights = enabled.then(SingleFlight::default);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Local collection, falling back to a remote backfill when it is empty.
    pub async fn get_collectibles(&self) -> Result<Vec<Collectible>> {
        let cached = self.store.fetch_all()?;
        if !cached.is_empty() {
            debug!(count = cached.len(), "serving collectibles from local store");
            return Ok(cached);
        }

        let user_id = self.require_user()?;
        let _flight = self.enter_flight(&user_id).await;
        if self.flights.is_some() {
            let cached = self.store.fetch_all()?;
            if !cached.is_empty() {
                debug!(count = cached.len(), user_id = %user_id, "backfilled by a concurrent call");
                return Ok(cached);
            }
        }

        let fetched = self.remote.fetch_collectibles(&user_id).await?;
        let inserted = self.store.add_many(&fetched)?;
        info!(
            user_id = %user_id,
            fetched = fetched.len(),
            inserted,
            "backfilled local store from remote"
        );
        Ok(fetched)
    }

    /// Replace the local collection with a fresh remote copy.
    pub async fn refresh_collectibles(&self) -> Result<Vec<Collectible>> {
        let user_id = self.require_user()?;
        let _flight = self.enter_flight(&user_id).await;

        let fetched = self.remote.fetch_collectibles(&user_id).await?;
        self.store.clear()?;
        let inserted = self.store.add_many(&fetched)?;
        info!(
            user_id = %user_id,
            fetched = fetched.len(),
            inserted,
            "refreshed local store from remote"
        );
        Ok(fetched)
    }

    /// Backfill semantics: items already stored are left as they are.
    pub fn add_items(&self, items: &[Collectible]) -> Result<usize> {
        self.store.add_many(items)
    }

    pub fn delete_item(&self, id: &str) -> Result<()> {
        self.store.delete(id)
    }

    pub fn update_item(&self, item: &Collectible) -> Result<()> {
        self.store.update(item)
    }

    pub fn update_gallery(&self, id: &str, images: &[String]) -> Result<()> {
        self.store.update_gallery(id, images)
    }

    pub fn contains(&self, item: &Collectible) -> Result<bool> {
        self.store.contains(item)
    }

    pub fn item(&self, id: &str) -> Result<Option<Collectible>> {
        self.store.get(id)
    }

    pub fn clear_database(&self) -> Result<()> {
        self.store.clear()
    }

    fn require_user(&self) -> Result<String> {
        self.users
            .current_user_id()
            .ok_or(KollectorError::NotAuthenticated)
    }

    async fn enter_flight(&self, user_id: &str) -> Option<Flight<'_>> {
        match &self.flights {
            Some(flights) => Some(flights.enter(user_id).await),
            None => None,
        }
    }
}
