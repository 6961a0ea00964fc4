//! Storage abstractions for snapshot persistence.
//!
//! Snapshots are append-only: one flat-text file per batch, grouped by day.
//!
//! ## Directory Structure
//!
//! ```text
//! output/
//! └── 2026-10-19/
//!     └── txt/
//!         ├── 08-00.txt
//!         └── 09-30.txt
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Persist a new batch. Existing batches are never overwritten.
    async fn write_snapshot(&self, date: NaiveDate, snapshot: &Snapshot) -> Result<()>;

    /// Batch labels stored for a day, oldest first.
    async fn list_labels(&self, date: NaiveDate) -> Result<Vec<String>>;

    /// Read one batch.
    async fn read_snapshot(&self, date: NaiveDate, label: &str) -> Result<Snapshot>;

    /// Read every batch of a day, oldest first. A day without data yields
    /// an empty list.
    async fn load_day(&self, date: NaiveDate) -> Result<Vec<Snapshot>> {
        let mut snapshots = Vec::new();
        for label in self.list_labels(date).await? {
            snapshots.push(self.read_snapshot(date, &label).await?);
        }
        Ok(snapshots)
    }
}
