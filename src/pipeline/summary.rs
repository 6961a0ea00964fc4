// src/pipeline/summary.rs

//! Generative summary hook.
//!
//! The summarizer groups the day's titles itself; its groups are resolved
//! back against the identity table and reported in the keyword-group shape.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{GroupStat, IdentityTable, TitleIdentity};

use super::aggregate::{Aggregator, SourceNames, percentage};

/// Titles of one source offered to the summarizer.
#[derive(Debug, Clone, Serialize)]
pub struct SummarySource<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub titles: Vec<&'a TitleIdentity>,
}

/// Reference to a title by source and one of its ranks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRef {
    /// Source id or display name
    pub source: String,
    pub rank: u32,
}

/// One group produced by the summarizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryGroup {
    pub keywords: Vec<String>,

    #[serde(default)]
    pub items: Vec<SummaryRef>,
}

/// External summarizer.
///
/// `Ok(None)` means the summarizer declined; callers fall back to keyword
/// aggregation, as they do on error.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, sources: &[SummarySource<'_>]) -> Result<Option<Vec<SummaryGroup>>>;
}

/// Collect the table's identities per source for the summarizer.
pub fn summary_sources<'a>(
    table: &'a IdentityTable,
    names: &'a SourceNames,
) -> Vec<SummarySource<'a>> {
    table
        .sources()
        .map(|source| SummarySource {
            id: &source.id,
            name: names.resolve(&source.id),
            titles: source.iter().collect(),
        })
        .collect()
}

/// Resolve summary groups into group stats.
///
/// Returns the stats and the number of resolved references, which is the
/// percentage denominator.
pub fn resolve_groups(
    groups: &[SummaryGroup],
    table: &IdentityTable,
    names: &SourceNames,
    aggregator: &Aggregator<'_>,
) -> (Vec<GroupStat>, usize) {
    let resolved: Vec<Vec<&TitleIdentity>> = groups
        .iter()
        .map(|group| {
            group
                .items
                .iter()
                .filter_map(|item| {
                    let found = find_identity(item, table, names);
                    if found.is_none() {
                        log::warn!(
                            "Summary reference {} #{} not found in today's titles",
                            item.source,
                            item.rank
                        );
                    }
                    found
                })
                .collect()
        })
        .collect();

    let total: usize = resolved.iter().map(Vec::len).sum();

    let stats = groups
        .iter()
        .zip(resolved)
        .enumerate()
        .map(|(position, (group, identities))| {
            let count = identities.len();
            let titles = identities
                .into_iter()
                .map(|identity| {
                    aggregator.matched_item(
                        identity.clone(),
                        names.resolve(&identity.source_id),
                        false,
                    )
                })
                .collect();
            GroupStat {
                word: group.keywords.join(" "),
                count,
                percentage: percentage(count, total),
                position,
                titles,
            }
        })
        .collect();

    (stats, total)
}

fn find_identity<'a>(
    item: &SummaryRef,
    table: &'a IdentityTable,
    names: &SourceNames,
) -> Option<&'a TitleIdentity> {
    let source = table
        .sources()
        .find(|s| s.id == item.source || names.resolve(&s.id) == item.source)?;
    source.iter().find(|identity| identity.ranks.contains(&item.rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Config, KeywordRules, TitleObservation, WeightConfig};
    use crate::pipeline::aggregate::AggregateOptions;
    use crate::services::{RuleMatcher, WeightScorer};

    fn table() -> IdentityTable {
        let mut table = IdentityTable::new();
        table.set_source_name("weibo", Some("微博"));
        table.observe("weibo", "A", "08-00", &TitleObservation::ranked(3));
        table.observe("weibo", "A", "09-00", &TitleObservation::ranked(1));
        table.observe("weibo", "B", "09-00", &TitleObservation::ranked(2));
        table.observe("zhihu", "C", "09-00", &TitleObservation::ranked(1));
        table
    }

    fn group(keywords: &[&str], items: &[(&str, u32)]) -> SummaryGroup {
        SummaryGroup {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            items: items
                .iter()
                .map(|(source, rank)| SummaryRef {
                    source: source.to_string(),
                    rank: *rank,
                })
                .collect(),
        }
    }

    #[test]
    fn test_resolve_by_id_and_name() {
        let table = table();
        let config = Config {
            platforms: Vec::new(),
            ..Config::default()
        };
        let names = SourceNames::new(&config, &table);
        let matcher = RuleMatcher::new(&KeywordRules::default());
        let aggregator = Aggregator::new(
            &matcher,
            WeightScorer::new(WeightConfig::default(), 5),
            AggregateOptions::default(),
        );

        let groups = vec![
            group(&["hot", "topic"], &[("微博", 3), ("zhihu", 1)]),
            group(&["other"], &[("weibo", 2), ("weibo", 40)]),
        ];
        let (stats, total) = resolve_groups(&groups, &table, &names, &aggregator);

        assert_eq!(total, 3);
        assert_eq!(stats[0].word, "hot topic");
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].percentage, 66.67);
        assert_eq!(stats[0].titles[0].identity.title, "A");
        assert_eq!(stats[0].titles[0].identity.ranks, vec![3, 1]);
        assert_eq!(stats[0].titles[0].source_name, "微博");
        assert!(!stats[0].titles[0].is_new);
        assert_eq!(stats[1].count, 1);
        assert_eq!(stats[1].position, 1);
    }

    #[test]
    fn test_summary_sources() {
        let table = table();
        let names = SourceNames::new(&Config::default(), &table);
        let sources = summary_sources(&table, &names);

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].name, "微博");
        assert_eq!(sources[0].titles.len(), 2);
    }
}
