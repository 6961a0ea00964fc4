//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── YYYY-MM-DD/
//!     └── txt/
//!         └── HH-MM.txt
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Snapshot;
use crate::services::codec;
use crate::storage::SnapshotStorage;
use crate::utils::time::{day_folder, validate_label};

const SNAPSHOT_DIR: &str = "txt";
const SNAPSHOT_EXT: &str = "txt";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Directory holding a day's batch files.
    pub fn day_dir(&self, date: NaiveDate) -> PathBuf {
        self.root_dir.join(day_folder(date)).join(SNAPSHOT_DIR)
    }

    /// Path of one batch file.
    pub fn snapshot_path(&self, date: NaiveDate, label: &str) -> PathBuf {
        self.day_dir(date)
            .join(format!("{}.{}", label, SNAPSHOT_EXT))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStorage for LocalStorage {
    async fn write_snapshot(&self, date: NaiveDate, snapshot: &Snapshot) -> Result<()> {
        validate_label(&snapshot.label)?;

        let path = self.snapshot_path(date, &snapshot.label);
        if tokio::fs::try_exists(&path).await? {
            return Err(AppError::validation(format!(
                "batch {} already exists at {}",
                snapshot.label,
                path.display()
            )));
        }

        self.write_bytes(&path, codec::encode(snapshot).as_bytes())
            .await?;
        log::info!(
            "Saved batch {} ({} titles) to {}",
            snapshot.label,
            snapshot.title_count(),
            path.display()
        );
        Ok(())
    }

    async fn list_labels(&self, date: NaiveDate) -> Result<Vec<String>> {
        let dir = self.day_dir(date);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No snapshots for {}", day_folder(date));
                return Ok(Vec::new());
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut labels = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                labels.push(stem.to_string());
            }
        }
        labels.sort();
        Ok(labels)
    }

    async fn read_snapshot(&self, date: NaiveDate, label: &str) -> Result<Snapshot> {
        let path = self.snapshot_path(date, label);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(codec::decode_bytes(label, &bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::missing(&path)),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}
