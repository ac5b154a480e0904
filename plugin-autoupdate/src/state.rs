//! The persisted record of downloaded release assets.
//!
//! On disk this is a flat JSON object mapping output file paths to the id of
//! the asset last written there.

use crate::error::UpdaterError;
use crate::files::StagedFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadRecord {
    ids: BTreeMap<String, u64>,
}

impl DownloadRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded asset id for an output path, `0` if unknown.
    pub fn get(&self, output: &str) -> u64 {
        self.ids.get(output).copied().unwrap_or(0)
    }

    pub fn insert(&mut self, output: impl Into<String>, asset_id: u64) {
        self.ids.insert(output.into(), asset_id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make sure the state directory and file exist.
    pub async fn prepare(&self) -> Result<(), UpdaterError> {
        tracing::debug!("Preparing download record at {}", self.path.display());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                tracing::error!("Failed to create state directory: {}", e);
                e
            })?;
        }

        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        Ok(())
    }

    /// Load the record; anything unreadable counts as an empty record.
    pub async fn load(&self) -> DownloadRecord {
        let data = match tokio::fs::read(&self.path).await {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!("Failed to read {}: {}", self.path.display(), err);
                return DownloadRecord::new();
            }
        };

        // A freshly prepared file is empty, that is not worth a warning
        if data.iter().all(u8::is_ascii_whitespace) {
            return DownloadRecord::new();
        }

        match serde_json::from_slice(&data) {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(
                    "Ignoring malformed download record {}: {}",
                    self.path.display(),
                    err
                );
                DownloadRecord::new()
            }
        }
    }

    /// Replace the file contents with `record`.
    pub async fn save(&self, record: &DownloadRecord) -> Result<(), UpdaterError> {
        let data = serde_json::to_vec_pretty(record)?;

        let mut file = StagedFile::create(&self.path)?;
        file.write_all(&data).await?;
        file.commit().await?;

        tracing::debug!(
            "Saved {} entries to {}",
            record.len(),
            self.path.display()
        );

        Ok(())
    }
}
