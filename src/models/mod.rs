// src/models/mod.rs

//! Domain models for the trend radar.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod identity;
mod keyword;
mod mode;
mod report;
mod snapshot;

// Re-export all public types
pub use config::{Config, PathsConfig, PlatformConfig, ReportConfig, WeightConfig};
pub use identity::{IdentityTable, SourceIdentities, TitleIdentity};
pub use keyword::{CATCH_ALL_GROUP_KEY, KeywordGroup, KeywordRules};
pub use mode::ReportMode;
pub use report::{AnalysisReport, GroupStat, MatchedItem, NoveltyMap};
pub use snapshot::{Snapshot, SourceSection, TitleObservation};
