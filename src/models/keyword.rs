//! Keyword rule configuration (frequency word groups).
//!
//! The rules file is a text blob of blank-line-separated groups. Within a
//! group, one entry per line:
//!
//! - `@N` caps the group's output at N titles (N > 0, otherwise ignored)
//! - `!word` filters out any title containing `word` (global)
//! - `+word` is required (all must appear)
//! - any other line is a normal word (at least one must appear)

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{AppError, Result};

/// Group key used when no groups are configured.
pub const CATCH_ALL_GROUP_KEY: &str = "All News";

/// A configured rule bundle defining one output bucket.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KeywordGroup {
    /// Words that must all appear
    pub required: Vec<String>,

    /// Words of which at least one must appear
    pub normal: Vec<String>,

    /// Filter words declared inside this group
    pub local_filter: Vec<String>,

    /// Output cap for this group (0 = use global cap)
    pub max_count: usize,

    /// Display key: normal words joined, else required words joined
    pub group_key: String,
}

impl KeywordGroup {
    /// Build a group, returning `None` if it has neither required nor
    /// normal words.
    pub fn new(
        required: Vec<String>,
        normal: Vec<String>,
        local_filter: Vec<String>,
        max_count: usize,
    ) -> Option<Self> {
        if required.is_empty() && normal.is_empty() {
            return None;
        }
        let group_key = if normal.is_empty() {
            required.join(" ")
        } else {
            normal.join(" ")
        };
        Some(Self {
            required,
            normal,
            local_filter,
            max_count,
            group_key,
        })
    }

    /// The synthetic group that matches every title.
    pub fn catch_all() -> Self {
        Self {
            required: Vec::new(),
            normal: Vec::new(),
            local_filter: Vec::new(),
            max_count: 0,
            group_key: CATCH_ALL_GROUP_KEY.to_string(),
        }
    }
}

/// Ordered keyword groups plus the global filter list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeywordRules {
    pub groups: Vec<KeywordGroup>,
    pub filter_words: Vec<String>,
}

impl KeywordRules {
    /// Parse a rules blob.
    pub fn parse(content: &str) -> Self {
        let content = content.replace("\r\n", "\n");
        let mut rules = Self::default();

        for block in content.split("\n\n") {
            let words: Vec<&str> = block
                .lines()
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .collect();
            if words.is_empty() {
                continue;
            }

            let mut required = Vec::new();
            let mut normal = Vec::new();
            let mut local_filter = Vec::new();
            let mut max_count = 0;

            for word in words {
                if let Some(n) = word.strip_prefix('@') {
                    match n.parse::<usize>() {
                        Ok(n) if n > 0 => max_count = n,
                        _ => log::debug!("Ignoring invalid group cap '{}'", word),
                    }
                } else if let Some(w) = word.strip_prefix('!') {
                    rules.filter_words.push(w.to_string());
                    local_filter.push(w.to_string());
                } else if let Some(w) = word.strip_prefix('+') {
                    required.push(w.to_string());
                } else {
                    normal.push(word.to_string());
                }
            }

            match KeywordGroup::new(required, normal, local_filter, max_count) {
                Some(group) => rules.groups.push(group),
                None => log::debug!("Dropping keyword group without match words"),
            }
        }

        rules
    }

    /// Load rules from a file. A missing file is fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::missing(path));
        }
        let content = fs::read_to_string(path)?;
        let rules = Self::parse(&content);
        log::info!(
            "Loaded {} keyword groups and {} filter words from {}",
            rules.groups.len(),
            rules.filter_words.len(),
            path.display()
        );
        Ok(rules)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
