//! Service layer for the trend radar.
//!
//! This module contains the business logic for:
//! - Snapshot serialization (`codec`)
//! - Identity merging (`IdentityMerger`)
//! - Keyword matching (`RuleMatcher`)
//! - Weight scoring (`WeightScorer`)

pub mod codec;
mod matcher;
mod merger;
mod scorer;

pub use matcher::RuleMatcher;
pub use merger::{IdentityMerger, SourceFilter};
pub use scorer::{MISSING_RANK, WeightScorer};
