//! # Configuration
//!
//! Kollector configuration is managed by [`confique`], which handles layered loading
//! from a TOML file, environment variables, and compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `KOLLECTOR_BACKEND`, `KOLLECTOR_DATA_DIR`, etc.
//! 2. **Config file**: `kollector.toml` passed to [`KollectorConfig::load`].
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key             | Default               | Description                                  |
//! |-----------------|-----------------------|----------------------------------------------|
//! | `backend`       | `json`                | Local store backend: `json` or `sqlite`      |
//! | `data_dir`      | OS data directory     | Where the store files live                   |
//! | `json_file`     | `collectibles.json`   | File name for the JSON snapshot store        |
//! | `sqlite_file`   | `collectibles.sqlite` | File name for the SQLite record store        |
//! | `single_flight` | `true`                | Collapse concurrent empty-cache backfills    |

use crate::error::{KollectorError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Deserialized through a plain string so env vars, TOML and compiled
// defaults all go through the same parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum BackendKind {
    /// Whole collection in one JSON document.
    #[default]
    Json,
    /// One SQLite row per collectible.
    Sqlite,
}

impl TryFrom<String> for BackendKind {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(BackendKind::Json),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(format!("unknown backend {:?} (expected json or sqlite)", other)),
        }
    }
}

/// Configuration for kollector, stored in `kollector.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KollectorConfig {
    #[config(env = "KOLLECTOR_BACKEND", default = "json")]
    pub backend: BackendKind,

    /// Directory for store files. When absent, the OS data directory is used.
    #[config(env = "KOLLECTOR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[config(env = "KOLLECTOR_JSON_FILE", default = "collectibles.json")]
    pub json_file: String,

    #[config(env = "KOLLECTOR_SQLITE_FILE", default = "collectibles.sqlite")]
    pub sqlite_file: String,

    /// Only one remote backfill per user in flight at a time.
    #[config(env = "KOLLECTOR_SINGLE_FLIGHT", default = true)]
    pub single_flight: bool,
}

impl Default for KollectorConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Json,
            data_dir: None,
            json_file: "collectibles.json".to_string(),
            sqlite_file: "collectibles.sqlite".to_string(),
            single_flight: true,
        }
    }
}

impl KollectorConfig {
    /// Layers environment variables over `path` (if it exists) over defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::builder().env().file(path.as_ref()).load()?)
    }

    /// The configured data directory, or the platform default.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        ProjectDirs::from("app", "Kollector", "kollector")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| KollectorError::Config("no home directory to place data in".to_string()))
    }
}
