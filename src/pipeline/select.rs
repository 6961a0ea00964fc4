// src/pipeline/select.rs

//! Mode-dependent selection of identities to aggregate.
//!
//! Each report mode is one [`SelectionStrategy`], picked once per run by
//! [`strategy_for`].

use std::borrow::Cow;

use crate::models::{IdentityTable, NoveltyMap, ReportMode, TitleIdentity};

/// Inputs shared by every selection strategy.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub table: &'a IdentityTable,
    pub novelty: &'a NoveltyMap,

    /// Label of the newest snapshot
    pub latest_label: &'a str,

    /// Only one snapshot exists for the day
    pub first_of_day: bool,
}

/// An identity handed to the matcher, with its novelty flag.
#[derive(Debug, Clone)]
pub struct Selected<'a> {
    pub identity: Cow<'a, TitleIdentity>,
    pub is_new: bool,
}

impl<'a> Selected<'a> {
    fn borrowed(identity: &'a TitleIdentity, is_new: bool) -> Self {
        Self {
            identity: Cow::Borrowed(identity),
            is_new,
        }
    }
}

/// Chooses which identities a run processes.
pub trait SelectionStrategy {
    fn select<'a>(&self, ctx: &SelectionContext<'a>) -> Vec<Selected<'a>>;
}

/// Every merged identity; novelty from the latest batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailySelection;

impl SelectionStrategy for DailySelection {
    fn select<'a>(&self, ctx: &SelectionContext<'a>) -> Vec<Selected<'a>> {
        ctx.table
            .iter()
            .map(|identity| {
                let is_new = ctx.novelty.contains(&identity.source_id, &identity.title);
                Selected::borrowed(identity, is_new)
            })
            .collect()
    }
}

/// Only titles new in the latest batch, all flagged new.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncrementalSelection;

impl SelectionStrategy for IncrementalSelection {
    fn select<'a>(&self, ctx: &SelectionContext<'a>) -> Vec<Selected<'a>> {
        if ctx.first_of_day {
            return ctx
                .table
                .iter()
                .map(|identity| Selected::borrowed(identity, true))
                .collect();
        }

        ctx.novelty
            .iter()
            .map(|(source_id, title, observation)| {
                let identity = match ctx.table.get(source_id, title) {
                    Some(identity) => Cow::Borrowed(identity),
                    None => Cow::Owned(TitleIdentity::first_seen(
                        source_id,
                        title,
                        ctx.latest_label,
                        observation,
                    )),
                };
                Selected {
                    identity,
                    is_new: true,
                }
            })
            .collect()
    }
}

/// Identities present on the latest batch, with their full-day history.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentSelection;

impl SelectionStrategy for CurrentSelection {
    fn select<'a>(&self, ctx: &SelectionContext<'a>) -> Vec<Selected<'a>> {
        let Some(latest) = ctx.table.latest_label() else {
            return Vec::new();
        };

        ctx.table
            .iter()
            .filter(|identity| identity.last_time == latest)
            .map(|identity| {
                let is_new = ctx.first_of_day
                    || ctx.novelty.contains(&identity.source_id, &identity.title);
                Selected::borrowed(identity, is_new)
            })
            .collect()
    }
}

/// Strategy for a mode. Summary mode selects like daily when it falls
/// back to keyword aggregation.
pub fn strategy_for(mode: ReportMode) -> Box<dyn SelectionStrategy> {
    match mode {
        ReportMode::Daily | ReportMode::LlmAnalysis => Box::new(DailySelection),
        ReportMode::Incremental => Box::new(IncrementalSelection),
        ReportMode::Current => Box::new(CurrentSelection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SourceSection, TitleObservation};

    fn table() -> IdentityTable {
        let mut table = IdentityTable::new();
        table.observe("S", "old", "08-00", &TitleObservation::ranked(4));
        table.observe("S", "kept", "08-00", &TitleObservation::ranked(2));
        table.observe("S", "kept", "09-00", &TitleObservation::ranked(1));
        table.observe("S", "fresh", "09-00", &TitleObservation::ranked(3));
        table
    }

    fn novelty() -> NoveltyMap {
        let mut section = SourceSection::new("S", None);
        section.insert("fresh", TitleObservation::ranked(3));
        let mut novelty = NoveltyMap::new();
        novelty.push(section);
        novelty
    }

    fn titles(selected: &[Selected<'_>]) -> Vec<String> {
        selected.iter().map(|s| s.identity.title.clone()).collect()
    }

    #[test]
    fn test_daily_selects_everything() {
        let (table, novelty) = (table(), novelty());
        let ctx = SelectionContext {
            table: &table,
            novelty: &novelty,
            latest_label: "09-00",
            first_of_day: false,
        };
        let selected = DailySelection.select(&ctx);

        assert_eq!(titles(&selected), vec!["old", "kept", "fresh"]);
        let new: Vec<bool> = selected.iter().map(|s| s.is_new).collect();
        assert_eq!(new, vec![false, false, true]);
    }

    #[test]
    fn test_incremental_first_of_day_all_new() {
        let mut table = IdentityTable::new();
        table.observe("S", "a", "08-00", &TitleObservation::ranked(1));
        table.observe("T", "b", "08-00", &TitleObservation::ranked(2));
        let novelty = NoveltyMap::new();
        let ctx = SelectionContext {
            table: &table,
            novelty: &novelty,
            latest_label: "08-00",
            first_of_day: true,
        };
        let selected = IncrementalSelection.select(&ctx);

        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|s| s.is_new));
    }

    #[test]
    fn test_incremental_uses_novelty_with_merged_history() {
        let (table, novelty) = (table(), novelty());
        let ctx = SelectionContext {
            table: &table,
            novelty: &novelty,
            latest_label: "09-00",
            first_of_day: false,
        };
        let selected = IncrementalSelection.select(&ctx);

        assert_eq!(titles(&selected), vec!["fresh"]);
        assert!(matches!(selected[0].identity, Cow::Borrowed(_)));
        assert!(selected[0].is_new);
    }

    #[test]
    fn test_incremental_falls_back_to_observation() {
        let table = IdentityTable::new();
        let novelty = novelty();
        let ctx = SelectionContext {
            table: &table,
            novelty: &novelty,
            latest_label: "09-00",
            first_of_day: false,
        };
        let selected = IncrementalSelection.select(&ctx);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].identity.first_time, "09-00");
        assert_eq!(selected[0].identity.ranks, vec![3]);
    }

    #[test]
    fn test_current_keeps_full_history() {
        let (table, novelty) = (table(), novelty());
        let ctx = SelectionContext {
            table: &table,
            novelty: &novelty,
            latest_label: "09-00",
            first_of_day: false,
        };
        let selected = CurrentSelection.select(&ctx);

        assert_eq!(titles(&selected), vec!["kept", "fresh"]);
        let kept = &selected[0].identity;
        assert_eq!(kept.ranks, vec![2, 1]);
        assert_eq!(kept.occurrence_count, 2);
        assert_eq!(kept.first_time, "08-00");
        assert!(!selected[0].is_new);
        assert!(selected[1].is_new);
    }

    #[test]
    fn test_current_first_of_day_all_new() {
        let mut table = IdentityTable::new();
        table.observe("S", "a", "08-00", &TitleObservation::ranked(1));
        let novelty = NoveltyMap::new();
        let ctx = SelectionContext {
            table: &table,
            novelty: &novelty,
            latest_label: "08-00",
            first_of_day: true,
        };
        let selected = CurrentSelection.select(&ctx);
        assert!(selected.iter().all(|s| s.is_new));
    }
}
