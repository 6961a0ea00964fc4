//! Application configuration structures.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::ReportMode;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Report selection and ordering settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Scoring weights
    #[serde(default)]
    pub weight: WeightConfig,

    /// Monitored platforms, in display order
    #[serde(default)]
    pub platforms: Vec<PlatformConfig>,

    /// File locations
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file. A missing file is fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::missing(path));
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load, apply environment overrides and validate. Every failure here
    /// aborts the run.
    pub fn load_for_run(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Recognized: `REPORT_MODE`, `SORT_BY_POSITION_FIRST`,
    /// `MAX_NEWS_PER_KEYWORD`, `FREQUENCY_WORDS_PATH`. Empty values are
    /// ignored.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(mode) = get("REPORT_MODE") {
            self.report.mode = mode.parse()?;
        }
        if let Some(flag) = get("SORT_BY_POSITION_FIRST") {
            self.report.sort_by_position_first =
                matches!(flag.to_lowercase().as_str(), "true" | "1");
        }
        if let Some(max) = get("MAX_NEWS_PER_KEYWORD") {
            let max: usize = max.parse().map_err(|_| {
                AppError::config(format!("MAX_NEWS_PER_KEYWORD is not a number: {max}"))
            })?;
            if max > 0 {
                self.report.max_news_per_keyword = max;
            }
        }
        if let Some(path) = get("FREQUENCY_WORDS_PATH") {
            self.paths.frequency_words = path;
        }
        Ok(())
    }

    /// Validate configuration values for consistency.
    pub fn validate(&self) -> Result<()> {
        self.weight.validate()?;
        if self.report.rank_threshold == 0 {
            return Err(AppError::config("report.rank_threshold must be >= 1"));
        }
        if !(-12..=14).contains(&self.report.utc_offset_hours) {
            return Err(AppError::config(
                "report.utc_offset_hours must be between -12 and 14",
            ));
        }
        if self.platforms.is_empty() {
            return Err(AppError::config("No platforms defined"));
        }
        let mut seen = HashSet::new();
        for platform in &self.platforms {
            if platform.id.trim().is_empty() {
                return Err(AppError::config("Platform with empty id"));
            }
            if !seen.insert(platform.id.as_str()) {
                return Err(AppError::config(format!(
                    "Duplicate platform id '{}'",
                    platform.id
                )));
            }
        }
        Ok(())
    }

    /// Ids of the monitored platforms, in configured order.
    pub fn platform_ids(&self) -> Vec<String> {
        self.platforms.iter().map(|p| p.id.clone()).collect()
    }

    /// Display name of a configured platform.
    pub fn platform_name(&self, id: &str) -> Option<&str> {
        self.platforms
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| p.name.as_deref())
    }

    /// Resolve the keyword rules path against a base directory.
    pub fn frequency_words_path(&self, base: &Path) -> PathBuf {
        base.join(&self.paths.frequency_words)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report: ReportConfig::default(),
            weight: WeightConfig::default(),
            platforms: defaults::default_platforms(),
            paths: PathsConfig::default(),
        }
    }
}

/// Report selection and ordering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Time-scoping strategy
    #[serde(default)]
    pub mode: ReportMode,

    /// Ranks at or above this count as "hot"
    #[serde(default = "defaults::rank_threshold")]
    pub rank_threshold: u32,

    /// Order groups by configured position before match count
    #[serde(default)]
    pub sort_by_position_first: bool,

    /// Global per-group cap (0 = unbounded)
    #[serde(default)]
    pub max_news_per_keyword: usize,

    /// Offset used to decide the calendar day of a run
    #[serde(default = "defaults::utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            mode: ReportMode::default(),
            rank_threshold: defaults::rank_threshold(),
            sort_by_position_first: false,
            max_news_per_keyword: 0,
            utc_offset_hours: defaults::utc_offset_hours(),
        }
    }
}

/// Scoring weights. Must sum to 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeightConfig {
    #[serde(default = "defaults::rank_weight")]
    pub rank_weight: f64,

    #[serde(default = "defaults::frequency_weight")]
    pub frequency_weight: f64,

    #[serde(default = "defaults::hotness_weight")]
    pub hotness_weight: f64,
}

impl WeightConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("rank_weight", self.rank_weight),
            ("frequency_weight", self.frequency_weight),
            ("hotness_weight", self.hotness_weight),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::config(format!(
                    "weight.{name} must be within [0, 1], got {value}"
                )));
            }
        }
        let total = self.rank_weight + self.frequency_weight + self.hotness_weight;
        if (total - 1.0).abs() > 0.001 {
            return Err(AppError::config(format!(
                "weights must sum to 1.0, got {total}"
            )));
        }
        Ok(())
    }
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            rank_weight: defaults::rank_weight(),
            frequency_weight: defaults::frequency_weight(),
            hotness_weight: defaults::hotness_weight(),
        }
    }
}

/// A monitored platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Source identifier used in snapshots
    pub id: String,

    /// Human-readable display name
    #[serde(default)]
    pub name: Option<String>,
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Snapshot root directory
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,

    /// Keyword rules file
    #[serde(default = "defaults::frequency_words")]
    pub frequency_words: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            frequency_words: defaults::frequency_words(),
        }
    }
}

mod defaults {
    use super::PlatformConfig;

    // Report defaults
    pub fn rank_threshold() -> u32 {
        5
    }
    pub fn utc_offset_hours() -> i32 {
        8
    }

    // Weight defaults
    pub fn rank_weight() -> f64 {
        0.6
    }
    pub fn frequency_weight() -> f64 {
        0.3
    }
    pub fn hotness_weight() -> f64 {
        0.1
    }

    // Path defaults
    pub fn output_dir() -> String {
        "output".into()
    }
    pub fn frequency_words() -> String {
        "config/frequency_words.txt".into()
    }

    // Platform defaults
    pub fn default_platforms() -> Vec<PlatformConfig> {
        [
            ("toutiao", "今日头条"),
            ("baidu", "百度热搜"),
            ("weibo", "微博"),
            ("zhihu", "知乎"),
            ("bilibili-hot-search", "bilibili 热搜"),
        ]
        .into_iter()
        .map(|(id, name)| PlatformConfig {
            id: id.to_string(),
            name: Some(name.to_string()),
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_weight_sum() {
        let mut config = Config::default();
        config.weight.hotness_weight = 0.2;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn validate_accepts_rounding_slack() {
        let mut config = Config::default();
        config.weight.rank_weight = 0.6005;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_platforms() {
        let mut config = Config::default();
        config.platforms.push(config.platforms[0].clone());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_threshold() {
        let mut config = Config::default();
        config.report.rank_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_toml() {
        let config: Config = toml::from_str(
            r#"
            [report]
            mode = "current"
            rank_threshold = 3

            [weight]
            rank_weight = 0.5
            frequency_weight = 0.4
            hotness_weight = 0.1

            [[platforms]]
            id = "weibo"
            name = "微博"

            [[platforms]]
            id = "zhihu"
            "#,
        )
        .unwrap();

        assert_eq!(config.report.mode, ReportMode::Current);
        assert_eq!(config.report.rank_threshold, 3);
        assert_eq!(config.platform_ids(), vec!["weibo", "zhihu"]);
        assert_eq!(config.platform_name("weibo"), Some("微博"));
        assert_eq!(config.platform_name("zhihu"), None);
        assert_eq!(config.paths.output_dir, "output");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_for_run_missing_file_is_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = Config::load_for_run(tmp.path().join("config.toml"));
        assert!(matches!(result, Err(AppError::MissingResource { .. })));
    }

    #[test]
    fn load_for_run_rejects_broken_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[report\nmode = ").unwrap();
        assert!(matches!(Config::load_for_run(&path), Err(AppError::Toml(_))));
    }

    #[test]
    fn load_for_run_rejects_inconsistent_weights() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[weight]\nrank_weight = 0.9\n").unwrap();
        assert!(matches!(Config::load_for_run(&path), Err(AppError::Config(_))));
    }

    #[test]
    fn env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("REPORT_MODE", "incremental"),
            ("SORT_BY_POSITION_FIRST", "1"),
            ("MAX_NEWS_PER_KEYWORD", "0"),
            ("FREQUENCY_WORDS_PATH", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.report.max_news_per_keyword = 7;
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.report.mode, ReportMode::Incremental);
        assert!(config.report.sort_by_position_first);
        assert_eq!(config.report.max_news_per_keyword, 7);
        assert_eq!(config.paths.frequency_words, "config/frequency_words.txt");
    }

    #[test]
    fn env_override_rejects_unknown_mode() {
        let mut config = Config::default();
        let result = config.apply_overrides(|k| (k == "REPORT_MODE").then(|| "hourly".to_string()));
        assert!(result.is_err());
    }
}
