// src/pipeline/ingest.rs

//! Snapshot ingestion from fetch results.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{Config, Snapshot, TitleObservation};
use crate::storage::SnapshotStorage;
use crate::utils::normalize_title;

/// Fetch output: source id → title → observation.
pub type FetchResult = BTreeMap<String, BTreeMap<String, TitleObservation>>;

/// Read a fetch result from a JSON file.
pub async fn load_fetch_result(path: &Path) -> Result<FetchResult> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::missing(path));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_slice(&bytes)?)
}

/// Build a snapshot from a fetch result.
///
/// Sources follow the configured platform order; sources missing from the
/// platform list come after, sorted by id. Titles are normalized and blank
/// titles are dropped.
pub fn build_snapshot(
    config: &Config,
    label: &str,
    fetched: &FetchResult,
    failed_ids: &[String],
) -> Snapshot {
    let mut snapshot = Snapshot::new(label);

    let configured: Vec<&str> = config.platforms.iter().map(|p| p.id.as_str()).collect();
    let known: HashSet<&str> = configured.iter().copied().collect();
    let order = configured
        .iter()
        .copied()
        .chain(fetched.keys().map(String::as_str).filter(|id| !known.contains(id)));

    for id in order {
        let Some(titles) = fetched.get(id) else {
            continue;
        };
        let name = config.platform_name(id).map(str::to_string);
        let section = snapshot.source_mut(id, name);
        for (raw_title, observation) in titles {
            let title = normalize_title(raw_title);
            if title.is_empty() {
                log::warn!("Dropping blank title from {}", id);
                continue;
            }
            section.insert(
                title,
                TitleObservation::new(
                    observation.ranks.clone(),
                    observation.url.as_str(),
                    observation.mobile_url.as_str(),
                ),
            );
        }
    }

    snapshot.failed_ids = failed_ids.to_vec();
    snapshot
}

/// Turn a fetch result into a stored snapshot.
pub async fn run_ingest(
    config: &Config,
    storage: &dyn SnapshotStorage,
    date: NaiveDate,
    label: &str,
    fetched: &FetchResult,
    failed_ids: &[String],
) -> Result<Snapshot> {
    crate::utils::log::header(&format!("Ingest batch {} {}", date, label));

    let snapshot = build_snapshot(config, label, fetched, failed_ids);
    storage.write_snapshot(date, &snapshot).await?;

    crate::utils::log::summary(
        "Ingest",
        &[
            ("Sources", snapshot.sources.len().to_string()),
            ("Titles", snapshot.title_count().to_string()),
            ("Failed", snapshot.failed_ids.len().to_string()),
        ],
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlatformConfig;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    const FETCH_JSON: &str = r#"{
        "zzz": { "Extra  title": { "ranks": [4] } },
        "weibo": {
            "  Big   news ": { "ranks": [2, 2, 0], "url": "https://a", "mobileUrl": "https://m" },
            " ": { "ranks": [1] }
        },
        "baidu": { "Other": { "ranks": [1] } }
    }"#;

    fn config() -> Config {
        let mut config = Config::default();
        config.platforms = vec![
            PlatformConfig {
                id: "baidu".to_string(),
                name: Some("百度热搜".to_string()),
            },
            PlatformConfig {
                id: "weibo".to_string(),
                name: None,
            },
        ];
        config
    }

    #[test]
    fn test_build_snapshot() {
        let fetched: FetchResult = serde_json::from_str(FETCH_JSON).unwrap();
        let snapshot = build_snapshot(&config(), "08-00", &fetched, &["toutiao".to_string()]);

        let order: Vec<&str> = snapshot.sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["baidu", "weibo", "zzz"]);
        assert_eq!(snapshot.sources[0].name.as_deref(), Some("百度热搜"));

        let weibo = snapshot.source("weibo").unwrap();
        assert_eq!(weibo.len(), 1);
        let big = weibo.get("Big news").unwrap();
        assert_eq!(big.ranks, vec![2]);
        assert_eq!(big.mobile_url, "https://m");

        assert!(snapshot.source("zzz").unwrap().contains("Extra title"));
        assert_eq!(snapshot.failed_ids, vec!["toutiao"]);
    }

    #[tokio::test]
    async fn test_run_ingest_writes_batch() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let fetched: FetchResult = serde_json::from_str(FETCH_JSON).unwrap();

        run_ingest(&config(), &storage, date, "08-00", &fetched, &[])
            .await
            .unwrap();

        let stored = storage.read_snapshot(date, "08-00").await.unwrap();
        assert_eq!(stored.title_count(), 3);
        assert_eq!(stored.source("weibo").unwrap().get("Big news").unwrap().url, "https://a");
    }

    #[tokio::test]
    async fn test_load_fetch_result_missing() {
        let tmp = TempDir::new().unwrap();
        let result = load_fetch_result(&tmp.path().join("nope.json")).await;
        assert!(matches!(result, Err(AppError::MissingResource { .. })));
    }
}
