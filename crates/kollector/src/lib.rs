//! # Kollector Architecture
//!
//! Kollector is the **data layer** of a collectibles catalog. The apps on top
//! of it (camera capture, grids, dashboards, paywalls) are its clients; this
//! crate only knows how the collection is cached on the device and how that
//! cache is filled from the backend.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository (repository.rs)                                 │
//! │  - Cache-first reads, remote backfill on empty              │
//! │  - Every mutation goes to the local store                   │
//! └─────────────────────────────────────────────────────────────┘
//!          │                     │                      │
//!          ▼                     ▼                      ▼
//! ┌─────────────────┐  ┌───────────────────┐  ┌───────────────────┐
//! │  Local Store    │  │  Remote Source    │  │  User Context     │
//! │  (store/)       │  │  (remote.rs)      │  │  (user.rs)        │
//! │  JSON snapshot, │  │  async, read-only │  │  who is signed in │
//! │  SQLite records │  │                   │  │                   │
//! └─────────────────┘  └───────────────────┘  └───────────────────┘
//!          │
//!          ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Model (model.rs) + Normalization (normalize.rs)            │
//! │  - Wire decoding rules, display derivations                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No Singletons
//!
//! Every collaborator is passed to [`CollectibleRepository::new`]. The store
//! backend is picked at construction (see [`store::open_store`]), the HTTP
//! transport is whatever implements [`RemoteDataSource`], and the signed-in
//! user comes from a [`UserContextProvider`].
//!
//! ## Testing Strategy
//!
//! 1. **Model / normalization**: pure unit tests on raw JSON and attribute values.
//! 2. **Stores**: unit tests per backend, plus `tests/store_contract.rs` which
//!    runs the same contract checks against every backend.
//! 3. **Repository**: async tests against [`InMemoryStore`] and the
//!    call-counting `test_utils::StubRemote`.
//!
//! ## Module Overview
//!
//! - [`model`]: `Collectible` and its parts
//! - [`normalize`]: estimated value and subject derivations
//! - [`store`]: `LocalStore` and its backends
//! - [`remote`]: `RemoteDataSource` and payload decoding
//! - [`user`]: `UserProfile` and `UserContextProvider`
//! - [`repository`]: `CollectibleRepository`
//! - [`config`]: `KollectorConfig`
//! - [`error`]: `KollectorError`

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod remote;
pub mod repository;
pub mod store;
pub mod user;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use config::{BackendKind, KollectorConfig};
pub use error::{ErrorKind, KollectorError, Result};
pub use model::{Attributes, Collectible, CustomAttributes, Images, RelatedSubject, Sale, SubjectKind};
pub use remote::{decode_collectibles, RemoteDataSource};
pub use repository::CollectibleRepository;
pub use store::fs::JsonFileStore;
pub use store::memory::InMemoryStore;
pub use store::sqlite::SqliteStore;
pub use store::{open_store, LocalStore};
pub use user::{SessionUserProvider, UserContextProvider, UserProfile};
