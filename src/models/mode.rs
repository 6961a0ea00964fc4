//! Report modes (time-scoping strategies).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which identities a run reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// Everything seen today
    #[default]
    Daily,
    /// Only titles new in the latest batch
    Incremental,
    /// Only titles on the latest batch, with full-day history
    Current,
    /// Grouping delegated to an external summarizer
    LlmAnalysis,
}

impl ReportMode {
    pub const ALL: [ReportMode; 4] = [
        ReportMode::Daily,
        ReportMode::Incremental,
        ReportMode::Current,
        ReportMode::LlmAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportMode::Daily => "daily",
            ReportMode::Incremental => "incremental",
            ReportMode::Current => "current",
            ReportMode::LlmAnalysis => "llm_analysis",
        }
    }

    /// Human-readable mode name.
    pub fn label(&self) -> &'static str {
        match self {
            ReportMode::Daily => "Daily summary",
            ReportMode::Incremental => "Incremental",
            ReportMode::Current => "Current ranking",
            ReportMode::LlmAnalysis => "Model summary",
        }
    }

    /// Whether each run produces a realtime report.
    pub fn sends_realtime(&self) -> bool {
        !matches!(self, ReportMode::Daily)
    }

    /// Whether a day summary is produced in addition to the realtime report.
    pub fn generates_summary(&self) -> bool {
        !matches!(self, ReportMode::LlmAnalysis)
    }

    /// Mode the day summary is computed with.
    pub fn summary_mode(&self) -> ReportMode {
        match self {
            ReportMode::Incremental | ReportMode::Daily => ReportMode::Daily,
            ReportMode::Current => ReportMode::Current,
            ReportMode::LlmAnalysis => ReportMode::LlmAnalysis,
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ReportMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Unknown report mode '{s}' (expected daily, incremental, current or llm_analysis)"
                ))
            })
    }
}
