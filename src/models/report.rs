//! Aggregation output structures handed to rendering and notification.

use serde::Serialize;

use crate::models::{ReportMode, SourceSection, TitleIdentity, TitleObservation};

/// A merged identity that matched a keyword group.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedItem {
    #[serde(flatten)]
    pub identity: TitleIdentity,

    /// Source display name
    pub source_name: String,

    /// Whether the title is new in the latest batch
    pub is_new: bool,

    /// Composite sort score
    pub score: f64,

    /// `first` or `[first ~ last]`
    pub time_display: String,
}

/// Final aggregate for one keyword group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupStat {
    /// Group key
    pub word: String,

    /// Number of matched titles before truncation
    pub count: usize,

    /// `count` as a percentage of processed titles, two decimals
    pub percentage: f64,

    /// Configured position of the group
    pub position: usize,

    /// Sorted and capped matched titles
    pub titles: Vec<MatchedItem>,
}

/// Titles present in the newest snapshot but absent from all older ones.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NoveltyMap {
    sources: Vec<SourceSection>,
}

impl NoveltyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source's new titles. Empty sections are not stored.
    pub fn push(&mut self, section: SourceSection) {
        if !section.is_empty() {
            self.sources.push(section);
        }
    }

    pub fn contains(&self, source_id: &str, title: &str) -> bool {
        self.source(source_id).is_some_and(|s| s.contains(title))
    }

    pub fn source(&self, source_id: &str) -> Option<&SourceSection> {
        self.sources.iter().find(|s| s.id == source_id)
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceSection> {
        self.sources.iter()
    }

    /// All new titles as (source, title, observation).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &TitleObservation)> {
        self.sources.iter().flat_map(|s| {
            s.titles()
                .map(move |(title, obs)| (s.id.as_str(), title, obs))
        })
    }

    pub fn len(&self) -> usize {
        self.sources.iter().map(SourceSection::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Result of one aggregation run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub mode: ReportMode,

    /// Number of snapshots found for the day
    pub batch_count: usize,

    /// Label of the newest snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_label: Option<String>,

    pub stats: Vec<GroupStat>,

    /// Distinct identities handed to the matcher
    pub total_titles_processed: usize,

    pub novelty: NoveltyMap,
}

impl AnalysisReport {
    /// An empty report; "no data" is a normal outcome.
    pub fn empty(mode: ReportMode) -> Self {
        Self {
            mode,
            batch_count: 0,
            latest_label: None,
            stats: Vec::new(),
            total_titles_processed: 0,
            novelty: NoveltyMap::new(),
        }
    }

    /// Total matched titles across groups.
    pub fn matched_count(&self) -> usize {
        self.stats.iter().map(|s| s.count).sum()
    }

    /// Whether the report carries anything worth delivering.
    pub fn has_content(&self) -> bool {
        let has_matches = self.stats.iter().any(|s| s.count > 0);
        match self.mode {
            ReportMode::Incremental | ReportMode::Current => has_matches,
            ReportMode::Daily | ReportMode::LlmAnalysis => has_matches || !self.novelty.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_novelty_skips_empty_sections() {
        let mut novelty = NoveltyMap::new();
        novelty.push(SourceSection::new("empty", None));

        let mut section = SourceSection::new("s", None);
        section.insert("y", TitleObservation::ranked(2));
        novelty.push(section);

        assert_eq!(novelty.sources().count(), 1);
        assert!(novelty.contains("s", "y"));
        assert!(!novelty.contains("s", "x"));
        assert_eq!(novelty.len(), 1);
    }

    #[test]
    fn test_has_content_daily_counts_novelty() {
        let mut report = AnalysisReport::empty(ReportMode::Daily);
        assert!(!report.has_content());

        let mut section = SourceSection::new("s", None);
        section.insert("y", TitleObservation::ranked(2));
        report.novelty.push(section);
        assert!(report.has_content());

        report.mode = ReportMode::Incremental;
        assert!(!report.has_content());
    }
}
