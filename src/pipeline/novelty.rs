// src/pipeline/novelty.rs

//! Novelty detection between same-day snapshots.
//!
//! Compares the newest snapshot against the union of raw title sets from
//! every strictly older snapshot of the day. The merged identity table is
//! not consulted.

use std::collections::{HashMap, HashSet};

use crate::models::{NoveltyMap, Snapshot, SourceSection};
use crate::services::SourceFilter;

/// Detector for titles new in the latest batch.
#[derive(Debug, Clone, Default)]
pub struct NoveltyDetector {
    filter: SourceFilter,
}

impl NoveltyDetector {
    pub fn new(filter: SourceFilter) -> Self {
        Self { filter }
    }

    /// Titles of the newest snapshot absent from all older ones.
    ///
    /// Snapshots must be ordered oldest first. Fewer than two snapshots
    /// always yields an empty map.
    pub fn detect(&self, snapshots: &[Snapshot]) -> NoveltyMap {
        let mut novelty = NoveltyMap::new();
        let Some((latest, older)) = snapshots.split_last() else {
            return novelty;
        };
        if older.is_empty() {
            return novelty;
        }

        let mut seen: HashMap<&str, HashSet<&str>> = HashMap::new();
        for snapshot in older {
            for section in self.filter.sections(snapshot) {
                seen.entry(section.id.as_str())
                    .or_default()
                    .extend(section.titles().map(|(title, _)| title));
            }
        }

        for section in self.filter.sections(latest) {
            let known = seen.get(section.id.as_str());
            let mut fresh = SourceSection::new(section.id.clone(), section.name.clone());
            for (title, observation) in section.titles() {
                if !known.is_some_and(|titles| titles.contains(title)) {
                    fresh.insert(title, observation.clone());
                }
            }
            novelty.push(fresh);
        }

        if !novelty.is_empty() {
            log::debug!(
                "Batch {}: {} new titles across {} sources",
                latest.label,
                novelty.len(),
                novelty.sources().count()
            );
        }
        novelty
    }
}
