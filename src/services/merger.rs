// src/services/merger.rs

//! Identity merger.
//!
//! Folds a day's chronological snapshots into one merged identity per
//! (source, title) pair.

use std::collections::HashSet;

use crate::models::{IdentityTable, Snapshot, SourceSection};

/// Optional allow-list of source ids applied before any merge or diff.
/// The default accepts every source.
#[derive(Debug, Clone, Default)]
pub struct SourceFilter {
    allowed: Option<HashSet<String>>,
}

impl SourceFilter {
    /// Accept only the listed sources.
    pub fn only<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: Some(ids.into_iter().map(Into::into).collect()),
        }
    }

    pub fn accepts(&self, source_id: &str) -> bool {
        self.allowed
            .as_ref()
            .is_none_or(|allowed| allowed.contains(source_id))
    }

    /// Sections of a snapshot that pass the filter.
    pub fn sections<'a>(
        &'a self,
        snapshot: &'a Snapshot,
    ) -> impl Iterator<Item = &'a SourceSection> + 'a {
        snapshot.sources.iter().filter(|s| self.accepts(&s.id))
    }
}

/// Service folding snapshots into an [`IdentityTable`].
#[derive(Debug, Clone, Default)]
pub struct IdentityMerger {
    filter: SourceFilter,
}

impl IdentityMerger {
    pub fn new(filter: SourceFilter) -> Self {
        Self { filter }
    }

    /// Merge snapshots, which must be ordered oldest first.
    pub fn merge(&self, snapshots: &[Snapshot]) -> IdentityTable {
        let mut table = IdentityTable::new();
        for snapshot in snapshots {
            self.fold(&mut table, snapshot);
        }
        log::debug!(
            "Merged {} snapshots into {} identities",
            snapshots.len(),
            table.len()
        );
        table
    }

    /// Fold a single, newer snapshot into an existing table.
    pub fn fold(&self, table: &mut IdentityTable, snapshot: &Snapshot) {
        for section in self.filter.sections(snapshot) {
            table.set_source_name(&section.id, section.name.as_deref());
            for (title, observation) in section.titles() {
                table.observe(&section.id, title, &snapshot.label, observation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TitleObservation;

    fn snapshot(label: &str, items: &[(&str, &str, &[u32])]) -> Snapshot {
        let mut snapshot = Snapshot::new(label);
        for (source, title, ranks) in items {
            snapshot
                .source_mut(source, None)
                .insert(*title, TitleObservation::new(ranks.to_vec(), "", ""));
        }
        snapshot
    }

    #[test]
    fn test_merge_same_snapshot_twice() {
        let s = snapshot("08-00", &[("a", "x", &[2, 5])]);
        let mut again = s.clone();
        again.label = "09-00".to_string();

        let table = IdentityMerger::default().merge(&[s, again]);
        let identity = table.get("a", "x").unwrap();
        assert_eq!(identity.occurrence_count, 2);
        assert_eq!(identity.ranks, vec![2, 5]);
    }

    #[test]
    fn test_ranks_never_shrink() {
        let snapshots = vec![
            snapshot("08-00", &[("a", "x", &[4])]),
            snapshot("09-00", &[("a", "x", &[1, 4])]),
            snapshot("10-00", &[("a", "x", &[4])]),
            snapshot("11-00", &[("a", "x", &[7])]),
        ];

        let merger = IdentityMerger::default();
        let mut table = IdentityTable::new();
        let mut previous = 0;
        for s in &snapshots {
            merger.fold(&mut table, s);
            let len = table.get("a", "x").unwrap().ranks.len();
            assert!(len >= previous);
            previous = len;
        }
        assert_eq!(table.get("a", "x").unwrap().ranks, vec![4, 1, 7]);
    }

    #[test]
    fn test_filter_applies_before_merge() {
        let snapshots = vec![
            snapshot("08-00", &[("a", "x", &[1]), ("b", "y", &[1])]),
            snapshot("09-00", &[("b", "y", &[2]), ("c", "z", &[3])]),
        ];

        let table = IdentityMerger::new(SourceFilter::only(["b", "c"])).merge(&snapshots);
        assert!(table.get("a", "x").is_none());
        assert_eq!(table.get("b", "y").unwrap().occurrence_count, 2);

        let order: Vec<&str> = table.sources().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c"]);
    }

    #[test]
    fn test_source_order_is_first_appearance() {
        let snapshots = vec![
            snapshot("08-00", &[("z", "1", &[1])]),
            snapshot("09-00", &[("a", "2", &[1]), ("z", "3", &[1])]),
        ];
        let table = IdentityMerger::default().merge(&snapshots);
        let order: Vec<&str> = table.sources().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["z", "a"]);
    }
}
