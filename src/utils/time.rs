// src/utils/time.rs

//! Day folders and batch labels.
//!
//! Snapshots live under a per-day folder (`YYYY-MM-DD`) and are named by
//! batch label (`HH-MM`), so lexical order of labels is time order.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use regex::Regex;

use crate::error::{AppError, Result};

static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3])-[0-5]\d$").expect("valid label regex"));

/// Current time at the configured UTC offset.
pub fn now_at(utc_offset_hours: i32) -> Result<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(utc_offset_hours * 3600).ok_or_else(|| {
        AppError::config(format!("Invalid UTC offset: {utc_offset_hours} hours"))
    })?;
    Ok(Utc::now().with_timezone(&offset))
}

/// Folder name for a day.
pub fn day_folder(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` day folder name.
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| AppError::validation(format!("Invalid date '{s}': {e}")))
}

/// Batch label for a point in time.
pub fn batch_label(now: &DateTime<FixedOffset>) -> String {
    now.format("%H-%M").to_string()
}

/// Validate a user-supplied batch label.
pub fn validate_label(label: &str) -> Result<()> {
    if LABEL_RE.is_match(label) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Invalid batch label '{label}' (expected HH-MM)"
        )))
    }
}
