//! Local filesystem storage for the seen set.
//!
//! Writes go to a temporary sibling file which is then renamed over the
//! target, so a crash never leaves a half-written store behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::SeenSet;
use crate::storage::SeenStore;

/// Seen set stored as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct LocalSeenStore {
    path: PathBuf,
}

impl LocalSeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Strict load, surfacing I/O and parse errors.
    pub async fn try_load(&self) -> Result<SeenSet> {
        match self.read_bytes().await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(SeenSet::new()),
        }
    }
}

#[async_trait]
impl SeenStore for LocalSeenStore {
    async fn load(&self) -> SeenSet {
        match self.try_load().await {
            Ok(seen) => {
                log::debug!(
                    "Loaded {} seen results from {}",
                    seen.len(),
                    self.path.display()
                );
                seen
            }
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable seen store {}: {}",
                    self.path.display(),
                    e
                );
                SeenSet::new()
            }
        }
    }

    async fn save(&self, seen: &SeenSet) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(seen)?;
        self.write_bytes(&bytes).await?;
        log::debug!("Saved {} seen results to {}", seen.len(), self.path.display());
        Ok(())
    }
}
