//! Local filesystem dedup store.
//!
//! The store is a single pretty-printed JSON object keyed by posting
//! identifier. Writes go to a temp file first and are renamed into place.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::SeenRecord;
use crate::storage::{SeenSet, SeenStorage, legacy_to_current};
use crate::utils::fs::{is_older_than, write_atomic};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a store backed by the JSON file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::store_corrupt(&self.path, e)),
        }
    }
}

#[async_trait]
impl SeenStorage for LocalStorage {
    async fn load(&self) -> Result<SeenSet> {
        let Some(bytes) = self.read_bytes().await? else {
            log::debug!("No dedup store at {}", self.path.display());
            return Ok(SeenSet::new());
        };

        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::store_corrupt(&self.path, e))?;
        let records =
            legacy_to_current(value).map_err(|e| AppError::store_corrupt(&self.path, e))?;

        Ok(SeenSet::from(records))
    }

    async fn persist(&self, seen: &SeenSet) -> Result<()> {
        let ordered: BTreeMap<&str, &SeenRecord> = seen
            .sorted()
            .into_iter()
            .map(|(id, record)| (id.as_str(), record))
            .collect();
        let bytes = serde_json::to_vec_pretty(&ordered)?;
        write_atomic(&self.path, &bytes).await?;
        log::debug!("Saved {} records to {}", seen.len(), self.path.display());
        Ok(())
    }

    async fn expire_if_stale(&self, max_age: Duration) -> Result<bool> {
        if !is_older_than(&self.path, max_age).await? {
            return Ok(false);
        }
        write_atomic(&self.path, b"{}").await?;
        log::info!(
            "Dedup store {} older than {}h, cleared",
            self.path.display(),
            max_age.as_secs() / 3600
        );
        Ok(true)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
