//! Day-scoped merged title identities.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::TitleObservation;

/// Merged record for one (source, title) pair across a day's snapshots.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TitleIdentity {
    pub source_id: String,
    pub title: String,

    /// Label of the first snapshot containing the pair
    pub first_time: String,

    /// Label of the latest snapshot containing the pair
    pub last_time: String,

    /// Number of snapshots containing the pair
    #[serde(rename = "count")]
    pub occurrence_count: u32,

    /// Union of observed ranks, first-seen order
    pub ranks: Vec<u32>,

    pub url: String,

    #[serde(rename = "mobileUrl")]
    pub mobile_url: String,
}

impl TitleIdentity {
    /// Create an identity from its first observation.
    pub fn first_seen(
        source_id: impl Into<String>,
        title: impl Into<String>,
        label: &str,
        observation: &TitleObservation,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            title: title.into(),
            first_time: label.to_string(),
            last_time: label.to_string(),
            occurrence_count: 1,
            ranks: observation.ranks.clone(),
            url: observation.url.clone(),
            mobile_url: observation.mobile_url.clone(),
        }
    }

    /// Fold a later observation into this identity.
    ///
    /// Count grows by one per call, ranks only grow, and non-empty URLs
    /// are never replaced.
    pub fn observe(&mut self, label: &str, observation: &TitleObservation) {
        self.last_time = label.to_string();
        self.occurrence_count += 1;

        for &rank in &observation.ranks {
            if !self.ranks.contains(&rank) {
                self.ranks.push(rank);
            }
        }

        if self.url.is_empty() {
            self.url = observation.url.clone();
        }
        if self.mobile_url.is_empty() {
            self.mobile_url = observation.mobile_url.clone();
        }
    }

    pub fn min_rank(&self) -> Option<u32> {
        self.ranks.iter().copied().min()
    }
}

/// Identities of one source, in first-appearance order.
#[derive(Debug, Clone, Default)]
pub struct SourceIdentities {
    pub id: String,
    pub name: Option<String>,
    identities: Vec<TitleIdentity>,
    index: HashMap<String, usize>,
}

impl SourceIdentities {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    pub fn get(&self, title: &str) -> Option<&TitleIdentity> {
        self.index.get(title).map(|&pos| &self.identities[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TitleIdentity> {
        self.identities.iter()
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

/// Merged identities for a day, grouped by source.
///
/// Source order is first appearance across the folded snapshots.
#[derive(Debug, Clone, Default)]
pub struct IdentityTable {
    sources: Vec<SourceIdentities>,
    index: HashMap<String, usize>,
}

impl IdentityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of `title` from `source_id` in batch `label`.
    pub fn observe(
        &mut self,
        source_id: &str,
        title: &str,
        label: &str,
        observation: &TitleObservation,
    ) {
        let source = self.source_entry(source_id);
        match source.index.get(title) {
            Some(&pos) => source.identities[pos].observe(label, observation),
            None => {
                source.index.insert(title.to_string(), source.identities.len());
                source
                    .identities
                    .push(TitleIdentity::first_seen(source_id, title, label, observation));
            }
        }
    }

    /// Remember a display name for a source. Later names win.
    pub fn set_source_name(&mut self, source_id: &str, name: Option<&str>) {
        if let Some(name) = name {
            self.source_entry(source_id).name = Some(name.to_string());
        }
    }

    fn source_entry(&mut self, source_id: &str) -> &mut SourceIdentities {
        let pos = match self.index.get(source_id) {
            Some(&pos) => pos,
            None => {
                self.index.insert(source_id.to_string(), self.sources.len());
                self.sources.push(SourceIdentities::new(source_id));
                self.sources.len() - 1
            }
        };
        &mut self.sources[pos]
    }

    pub fn source(&self, source_id: &str) -> Option<&SourceIdentities> {
        self.index.get(source_id).map(|&pos| &self.sources[pos])
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceIdentities> {
        self.sources.iter()
    }

    pub fn get(&self, source_id: &str, title: &str) -> Option<&TitleIdentity> {
        self.source(source_id).and_then(|s| s.get(title))
    }

    /// All identities, source order then first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = &TitleIdentity> {
        self.sources.iter().flat_map(SourceIdentities::iter)
    }

    /// Total identity count.
    pub fn len(&self) -> usize {
        self.sources.iter().map(SourceIdentities::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Greatest `last_time` across all identities.
    pub fn latest_label(&self) -> Option<&str> {
        self.iter().map(|i| i.last_time.as_str()).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_merges_ranks_and_count() {
        let mut table = IdentityTable::new();
        table.observe("s", "A", "0800", &TitleObservation::ranked(3));
        table.observe("s", "A", "0900", &TitleObservation::new(vec![1, 3], "", ""));

        let identity = table.get("s", "A").unwrap();
        assert_eq!(identity.ranks, vec![3, 1]);
        assert_eq!(identity.occurrence_count, 2);
        assert_eq!(identity.first_time, "0800");
        assert_eq!(identity.last_time, "0900");
    }

    #[test]
    fn test_url_backfill_never_overwrites() {
        let mut identity =
            TitleIdentity::first_seen("s", "A", "0800", &TitleObservation::ranked(1));
        identity.observe("0900", &TitleObservation::new(vec![1], "first", ""));
        identity.observe("1000", &TitleObservation::new(vec![1], "second", "m"));

        assert_eq!(identity.url, "first");
        assert_eq!(identity.mobile_url, "m");
    }

    #[test]
    fn test_latest_label() {
        let mut table = IdentityTable::new();
        table.observe("a", "x", "0800", &TitleObservation::ranked(1));
        table.observe("b", "y", "1000", &TitleObservation::ranked(1));
        assert_eq!(table.latest_label(), Some("1000"));
        assert_eq!(table.len(), 2);
    }
}
