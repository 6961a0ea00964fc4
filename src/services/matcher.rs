// src/services/matcher.rs

//! Keyword rule matcher.
//!
//! Case-insensitive substring matching. A title containing any global
//! filter word is rejected; otherwise groups are tried in configured order
//! and the first match wins. With no configured groups a single catch-all
//! group accepts every title.

use crate::models::{KeywordGroup, KeywordRules};

/// Lowercased words of one group.
#[derive(Debug, Clone)]
struct CompiledGroup {
    required: Vec<String>,
    normal: Vec<String>,
}

impl CompiledGroup {
    fn new(group: &KeywordGroup) -> Self {
        Self {
            required: lowercase_all(&group.required),
            normal: lowercase_all(&group.normal),
        }
    }

    fn matches(&self, title_lower: &str) -> bool {
        let required_ok = self.required.iter().all(|w| title_lower.contains(w.as_str()));
        let normal_ok =
            self.normal.is_empty() || self.normal.iter().any(|w| title_lower.contains(w.as_str()));
        required_ok && normal_ok
    }
}

/// Matcher built once per run from the configured rules.
#[derive(Debug, Clone)]
pub struct RuleMatcher {
    groups: Vec<KeywordGroup>,
    compiled: Vec<CompiledGroup>,
    filter_words: Vec<String>,
}

impl RuleMatcher {
    pub fn new(rules: &KeywordRules) -> Self {
        let (groups, filter_words) = if rules.is_empty() {
            log::info!("No keyword groups configured, every title matches");
            (vec![KeywordGroup::catch_all()], Vec::new())
        } else {
            (rules.groups.clone(), lowercase_all(&rules.filter_words))
        };
        let compiled = groups.iter().map(CompiledGroup::new).collect();
        Self {
            groups,
            compiled,
            filter_words,
        }
    }

    /// Effective groups, in configured order.
    pub fn groups(&self) -> &[KeywordGroup] {
        &self.groups
    }

    /// Index of the first group matching `title`, if any.
    pub fn match_group(&self, title: &str) -> Option<usize> {
        if title.trim().is_empty() {
            return None;
        }
        let title_lower = title.to_lowercase();
        if self
            .filter_words
            .iter()
            .any(|w| title_lower.contains(w.as_str()))
        {
            return None;
        }
        self.compiled.iter().position(|g| g.matches(&title_lower))
    }

    /// Whether `title` matches any group.
    pub fn matches(&self, title: &str) -> bool {
        self.match_group(title).is_some()
    }
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CATCH_ALL_GROUP_KEY;

    #[test]
    fn test_normal_words_match() {
        let matcher = RuleMatcher::new(&KeywordRules::parse("苹果\n华为"));
        assert_eq!(matcher.match_group("苹果发布新品"), Some(0));
        assert!(!matcher.matches("小米发布新品"));
    }

    #[test]
    fn test_global_filter_rejects() {
        let matcher = RuleMatcher::new(&KeywordRules::parse("苹果\n华为\n\n!发布\n+新品"));
        assert!(!matcher.matches("苹果发布新品"));
        assert!(matcher.matches("苹果新品上市"));
    }

    #[test]
    fn test_first_match_wins() {
        let matcher = RuleMatcher::new(&KeywordRules::parse("rust\n\n+rust\n+async"));
        assert_eq!(matcher.match_group("Rust async runtime"), Some(0));
    }

    #[test]
    fn test_required_and_normal_combined() {
        let matcher = RuleMatcher::new(&KeywordRules::parse("+AI\n芯片\n显卡"));
        assert!(matcher.matches("ai 芯片突破"));
        assert!(!matcher.matches("AI 大模型"));
        assert!(!matcher.matches("芯片涨价"));
    }

    #[test]
    fn test_case_insensitive() {
        let matcher = RuleMatcher::new(&KeywordRules::parse("OpenAI\n\n!SPAM"));
        assert!(matcher.matches("openai ships"));
        assert!(!matcher.matches("OpenAI spam post"));
    }

    #[test]
    fn test_empty_rules_catch_all() {
        let rules = KeywordRules::parse("!ignored");
        let matcher = RuleMatcher::new(&rules);
        assert_eq!(matcher.groups().len(), 1);
        assert_eq!(matcher.groups()[0].group_key, CATCH_ALL_GROUP_KEY);
        assert!(matcher.matches("ignored words still pass"));
        assert!(!matcher.matches("   "));
    }
}
