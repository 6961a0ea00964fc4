// src/pipeline/analyze.rs

//! Trend analysis over a day's snapshots.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{
    AnalysisReport, Config, GroupStat, IdentityTable, KeywordRules, ReportMode, Snapshot,
};
use crate::services::{IdentityMerger, RuleMatcher, SourceFilter, WeightScorer};
use crate::storage::SnapshotStorage;

use super::aggregate::{AggregateOptions, Aggregator, SourceNames};
use super::novelty::NoveltyDetector;
use super::select::{SelectionContext, strategy_for};
use super::summary::{Summarizer, resolve_groups, summary_sources};

/// Synchronous aggregation engine.
///
/// Built once per run from explicit configuration; holds no state between
/// calls to [`Analyzer::analyze`].
pub struct Analyzer<'a> {
    config: &'a Config,
    mode: ReportMode,
    matcher: RuleMatcher,
    scorer: WeightScorer,
    summarizer: Option<&'a dyn Summarizer>,
}

impl<'a> Analyzer<'a> {
    pub fn new(config: &'a Config, rules: &KeywordRules) -> Self {
        Self {
            config,
            mode: config.report.mode,
            matcher: RuleMatcher::new(rules),
            scorer: WeightScorer::new(config.weight, config.report.rank_threshold),
            summarizer: None,
        }
    }

    pub fn with_summarizer(mut self, summarizer: &'a dyn Summarizer) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    fn source_filter(&self) -> SourceFilter {
        SourceFilter::only(self.config.platform_ids())
    }

    /// Analyze a day's snapshots, ordered oldest first.
    pub fn analyze(&self, snapshots: &[Snapshot]) -> AnalysisReport {
        let Some(latest) = snapshots.last() else {
            log::info!("No snapshots to analyze");
            return AnalysisReport::empty(self.mode);
        };

        let filter = self.source_filter();
        let table = IdentityMerger::new(filter.clone()).merge(snapshots);
        let novelty = NoveltyDetector::new(filter).detect(snapshots);
        let names = SourceNames::new(self.config, &table);
        let aggregator = Aggregator::new(
            &self.matcher,
            self.scorer,
            AggregateOptions::from_config(self.config),
        );

        let mut report = AnalysisReport::empty(self.mode);
        report.batch_count = snapshots.len();
        report.latest_label = Some(latest.label.clone());

        if self.mode == ReportMode::LlmAnalysis {
            if let Some((stats, total)) = self.summarize(&table, &names, &aggregator) {
                report.stats = stats;
                report.total_titles_processed = total;
                report.novelty = novelty;
                return report;
            }
        }

        let ctx = SelectionContext {
            table: &table,
            novelty: &novelty,
            latest_label: &latest.label,
            first_of_day: snapshots.len() == 1,
        };
        let selected = strategy_for(self.mode).select(&ctx);
        if selected.is_empty() {
            log::info!("Mode {}: nothing selected from batch {}", self.mode, latest.label);
        }

        let aggregation = aggregator.aggregate(selected, &names);
        report.stats = aggregation.stats;
        report.total_titles_processed = aggregation.total_titles_processed;
        report.novelty = novelty;
        report
    }

    /// Ask the summarizer for groups. `None` means fall back to keywords.
    fn summarize(
        &self,
        table: &IdentityTable,
        names: &SourceNames,
        aggregator: &Aggregator<'_>,
    ) -> Option<(Vec<GroupStat>, usize)> {
        let Some(summarizer) = self.summarizer else {
            log::warn!("No summarizer available, falling back to keyword aggregation");
            return None;
        };

        match summarizer.summarize(&summary_sources(table, names)) {
            Ok(Some(groups)) => Some(resolve_groups(&groups, table, names, aggregator)),
            Ok(None) => {
                log::warn!("Summarizer returned no groups, falling back to keyword aggregation");
                None
            }
            Err(e) => {
                log::warn!("{}, falling back to keyword aggregation", e);
                None
            }
        }
    }
}

/// Load a day's snapshots and analyze them.
pub async fn run_analysis(
    config: &Config,
    rules: &KeywordRules,
    storage: &dyn SnapshotStorage,
    date: NaiveDate,
    summarizer: Option<&dyn Summarizer>,
) -> Result<AnalysisReport> {
    crate::utils::log::header(&format!(
        "Trend analysis {} ({})",
        date,
        config.report.mode.label()
    ));

    crate::utils::log::step(1, 2, "Load - Reading snapshots");
    let snapshots = storage.load_day(date).await?;
    crate::utils::log::sub_item(&format!("{} batches", snapshots.len()));

    crate::utils::log::step(2, 2, "Aggregate - Matching and scoring titles");
    let mut analyzer = Analyzer::new(config, rules);
    if let Some(summarizer) = summarizer {
        analyzer = analyzer.with_summarizer(summarizer);
    }
    let report = analyzer.analyze(&snapshots);

    crate::utils::log::summary(
        "Analysis",
        &[
            ("Mode", report.mode.to_string()),
            ("Batches", report.batch_count.to_string()),
            ("Processed", report.total_titles_processed.to_string()),
            ("Matched", report.matched_count().to_string()),
            ("New", report.novelty.len().to_string()),
        ],
    );

    Ok(report)
}
