//! Pipeline entry points for trend analysis.
//!
//! - `run_ingest`: Store a fetch result as a new snapshot batch
//! - `run_analysis`: Aggregate a day's snapshots into a report

pub mod aggregate;
pub mod analyze;
pub mod ingest;
pub mod novelty;
pub mod select;
pub mod summary;

pub use aggregate::{AggregateOptions, Aggregation, Aggregator, SourceNames};
pub use analyze::{Analyzer, run_analysis};
pub use ingest::{FetchResult, build_snapshot, load_fetch_result, run_ingest};
pub use novelty::NoveltyDetector;
pub use select::{SelectionContext, SelectionStrategy, Selected, strategy_for};
pub use summary::{SummaryGroup, SummaryRef, SummarySource, Summarizer};
