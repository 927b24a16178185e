use super::backend::SnapshotBackend;
use crate::error::{KollectorError, Result};
use crate::model::Collectible;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Keeps the collection as one pretty-printed JSON array on disk.
pub struct FsBackend {
    path: PathBuf,
}

impl FsBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path).map_err(KollectorError::Io)?;
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("collectibles");
        self.dir().join(format!(".{}-{}.tmp", stem, Uuid::new_v4()))
    }
}

impl SnapshotBackend for FsBackend {
    fn load(&self) -> Result<Vec<Collectible>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(KollectorError::Io)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            KollectorError::Decoding(format!("{}: {}", self.path.display(), e))
        })
    }

    fn save(&self, items: &[Collectible]) -> Result<()> {
        self.ensure_dir(self.dir())?;

        let content = serde_json::to_string_pretty(items).map_err(KollectorError::Serialization)?;

        // Atomic write
        let tmp_file = self.tmp_path();
        fs::write(&tmp_file, content).map_err(KollectorError::Io)?;
        if let Err(e) = fs::rename(&tmp_file, &self.path) {
            let _ = fs::remove_file(&tmp_file);
            return Err(KollectorError::Io(e));
        }

        Ok(())
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}
