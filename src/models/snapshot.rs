//! Snapshot data structures: one crawl batch keyed by source.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One observation of a title inside a single snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TitleObservation {
    /// Distinct positive ranks in first-seen order
    #[serde(default)]
    pub ranks: Vec<u32>,

    /// Desktop URL (empty if unknown)
    #[serde(default)]
    pub url: String,

    /// Mobile URL (empty if unknown)
    #[serde(default, rename = "mobileUrl")]
    pub mobile_url: String,
}

impl TitleObservation {
    /// Create an observation, dropping zero and duplicate ranks.
    pub fn new(ranks: Vec<u32>, url: impl Into<String>, mobile_url: impl Into<String>) -> Self {
        let mut distinct = Vec::with_capacity(ranks.len());
        for rank in ranks {
            if rank > 0 && !distinct.contains(&rank) {
                distinct.push(rank);
            }
        }
        Self {
            ranks: distinct,
            url: url.into(),
            mobile_url: mobile_url.into(),
        }
    }

    /// Observation with a single rank.
    pub fn ranked(rank: u32) -> Self {
        Self::new(vec![rank], "", "")
    }

    /// Lowest rank, if any.
    pub fn min_rank(&self) -> Option<u32> {
        self.ranks.iter().copied().min()
    }
}

/// All titles observed for one source within one snapshot.
///
/// Titles keep insertion order; re-inserting a title replaces its
/// observation in place.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceSection {
    /// Source identifier
    pub id: String,

    /// Optional display name from the snapshot header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    titles: Vec<(String, TitleObservation)>,

    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SourceSection {
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
            titles: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert or replace a title's observation.
    pub fn insert(&mut self, title: impl Into<String>, observation: TitleObservation) {
        let title = title.into();
        match self.index.get(&title) {
            Some(&pos) => self.titles[pos].1 = observation,
            None => {
                self.index.insert(title.clone(), self.titles.len());
                self.titles.push((title, observation));
            }
        }
    }

    pub fn get(&self, title: &str) -> Option<&TitleObservation> {
        self.index.get(title).map(|&pos| &self.titles[pos].1)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.index.contains_key(title)
    }

    /// Iterate titles in insertion order.
    pub fn titles(&self) -> impl Iterator<Item = (&str, &TitleObservation)> {
        self.titles.iter().map(|(t, o)| (t.as_str(), o))
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// One crawl batch.
///
/// `label` is the batch label; lexical order of labels equals time order
/// within a day.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub label: String,
    pub sources: Vec<SourceSection>,
    pub failed_ids: Vec<String>,
}

impl Snapshot {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn source(&self, id: &str) -> Option<&SourceSection> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Get a source section, creating it on first use.
    pub fn source_mut(&mut self, id: &str, name: Option<String>) -> &mut SourceSection {
        let pos = match self.sources.iter().position(|s| s.id == id) {
            Some(pos) => pos,
            None => {
                self.sources.push(SourceSection::new(id, name.clone()));
                self.sources.len() - 1
            }
        };
        let section = &mut self.sources[pos];
        if section.name.is_none() {
            section.name = name;
        }
        section
    }

    /// Total number of titles across all sources.
    pub fn title_count(&self) -> usize {
        self.sources.iter().map(SourceSection::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_dedups_ranks() {
        let obs = TitleObservation::new(vec![3, 1, 3, 0, 2, 1], "u", "");
        assert_eq!(obs.ranks, vec![3, 1, 2]);
        assert_eq!(obs.min_rank(), Some(1));
    }

    #[test]
    fn test_section_replace_keeps_position() {
        let mut section = SourceSection::new("weibo", None);
        section.insert("a", TitleObservation::ranked(1));
        section.insert("b", TitleObservation::ranked(2));
        section.insert("a", TitleObservation::ranked(7));

        let titles: Vec<_> = section.titles().map(|(t, o)| (t, o.ranks[0])).collect();
        assert_eq!(titles, vec![("a", 7), ("b", 2)]);
    }

    #[test]
    fn test_fetch_json_shape() {
        let json = r#"{"ranks": [2, 5], "url": "https://a", "mobileUrl": "https://m"}"#;
        let obs: TitleObservation = serde_json::from_str(json).unwrap();
        assert_eq!(obs.ranks, vec![2, 5]);
        assert_eq!(obs.mobile_url, "https://m");
    }
}
