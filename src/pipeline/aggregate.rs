// src/pipeline/aggregate.rs

//! Keyword group aggregation.
//!
//! Runs the selected identities through the matcher, scores matches,
//! then sorts and caps each group.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Config, GroupStat, IdentityTable, MatchedItem, TitleIdentity};
use crate::services::{MISSING_RANK, RuleMatcher, WeightScorer};
use crate::utils::format_time_display;

use super::select::Selected;

/// Display names per source id.
///
/// Configured platform names win over names from snapshot headers; the id
/// itself is the last resort.
#[derive(Debug, Clone, Default)]
pub struct SourceNames {
    names: HashMap<String, String>,
}

impl SourceNames {
    pub fn new(config: &Config, table: &IdentityTable) -> Self {
        let mut names = HashMap::new();
        for source in table.sources() {
            if let Some(name) = &source.name {
                names.insert(source.id.clone(), name.clone());
            }
        }
        for platform in &config.platforms {
            if let Some(name) = &platform.name {
                names.insert(platform.id.clone(), name.clone());
            }
        }
        Self { names }
    }

    pub fn resolve<'a>(&'a self, source_id: &'a str) -> &'a str {
        self.names.get(source_id).map_or(source_id, String::as_str)
    }
}

/// Options controlling truncation and group order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateOptions {
    /// Cap for groups without their own `@N`; 0 means unbounded
    pub max_per_group: usize,

    /// Order groups by configured position before count
    pub sort_by_position_first: bool,
}

impl AggregateOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_per_group: config.report.max_news_per_keyword,
            sort_by_position_first: config.report.sort_by_position_first,
        }
    }
}

/// Output of one aggregation pass.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub stats: Vec<GroupStat>,
    pub total_titles_processed: usize,
}

pub struct Aggregator<'a> {
    matcher: &'a RuleMatcher,
    scorer: WeightScorer,
    options: AggregateOptions,
}

impl<'a> Aggregator<'a> {
    pub fn new(matcher: &'a RuleMatcher, scorer: WeightScorer, options: AggregateOptions) -> Self {
        Self {
            matcher,
            scorer,
            options,
        }
    }

    /// Build a scored item for a matched identity.
    pub fn matched_item(
        &self,
        mut identity: TitleIdentity,
        source_name: &str,
        is_new: bool,
    ) -> MatchedItem {
        if identity.ranks.is_empty() {
            identity.ranks.push(MISSING_RANK);
        }
        let score = self
            .scorer
            .score(&identity.ranks, identity.occurrence_count);
        let time_display = format_time_display(&identity.first_time, &identity.last_time);
        MatchedItem {
            identity,
            source_name: source_name.to_string(),
            is_new,
            score,
            time_display,
        }
    }

    /// Group, sort and cap the selected identities.
    ///
    /// Every configured group appears in the output, including groups with
    /// no matches.
    pub fn aggregate(&self, selected: Vec<Selected<'_>>, names: &SourceNames) -> Aggregation {
        let groups = self.matcher.groups();
        let total = selected.len();
        let mut buckets: Vec<Vec<MatchedItem>> = vec![Vec::new(); groups.len()];

        for item in selected {
            let Some(idx) = self.matcher.match_group(&item.identity.title) else {
                continue;
            };
            let source_name = names.resolve(&item.identity.source_id).to_string();
            buckets[idx].push(self.matched_item(
                item.identity.into_owned(),
                &source_name,
                item.is_new,
            ));
        }

        let mut stats: Vec<GroupStat> = groups
            .iter()
            .zip(buckets)
            .enumerate()
            .map(|(position, (group, mut titles))| {
                let count = titles.len();
                titles.sort_by(compare_items);

                let cap = if group.max_count > 0 {
                    group.max_count
                } else {
                    self.options.max_per_group
                };
                if cap > 0 {
                    titles.truncate(cap);
                }

                GroupStat {
                    word: group.group_key.clone(),
                    count,
                    percentage: percentage(count, total),
                    position,
                    titles,
                }
            })
            .collect();

        if self.options.sort_by_position_first {
            stats.sort_by(|a, b| a.position.cmp(&b.position).then(b.count.cmp(&a.count)));
        } else {
            stats.sort_by(|a, b| b.count.cmp(&a.count).then(a.position.cmp(&b.position)));
        }

        log::debug!(
            "Aggregated {} titles into {} groups",
            total,
            stats.len()
        );

        Aggregation {
            stats,
            total_titles_processed: total,
        }
    }
}

/// Score descending, then lowest rank ascending, then count descending.
fn compare_items(a: &MatchedItem, b: &MatchedItem) -> Ordering {
    let min_rank = |item: &MatchedItem| item.identity.min_rank().unwrap_or(MISSING_RANK);
    b.score
        .total_cmp(&a.score)
        .then_with(|| min_rank(a).cmp(&min_rank(b)))
        .then_with(|| b.identity.occurrence_count.cmp(&a.identity.occurrence_count))
}

/// Share of `count` in `total`, percent with two decimals.
pub(crate) fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 10_000.0).round() / 100.0
}
