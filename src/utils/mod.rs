//! Utility functions and helpers.

pub mod log;
pub mod time;

/// Normalize a title: collapse internal whitespace and trim.
pub fn normalize_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format the first/last seen labels of a title for display.
pub fn format_time_display(first_time: &str, last_time: &str) -> String {
    if first_time.is_empty() {
        return String::new();
    }
    if last_time.is_empty() || first_time == last_time {
        first_time.to_string()
    } else {
        format!("[{} ~ {}]", first_time, last_time)
    }
}

/// Rank range of a title, with a flag for renderers to emphasize hot items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankDisplay {
    pub text: String,
    pub highlight: bool,
}

/// Format a rank list as `[min]` or `[min - max]`.
pub fn format_rank_display(ranks: &[u32], rank_threshold: u32) -> Option<RankDisplay> {
    let min = ranks.iter().copied().min()?;
    let max = ranks.iter().copied().max()?;
    let text = if min == max {
        format!("[{}]", min)
    } else {
        format!("[{} - {}]", min, max)
    };
    Some(RankDisplay {
        text,
        highlight: min <= rank_threshold,
    })
}
