// src/services/codec.rs

//! Flat-text snapshot codec.
//!
//! ```text
//! weibo | 微博
//! 1. Title one [URL:https://a] [MOBILE:https://m.a]
//! 2. Title two
//!
//! zhihu
//! 1. Another title
//!
//! ==== FAILED IDS ====
//! toutiao
//! ```
//!
//! Parsing is lenient: a malformed line is logged and skipped, it never
//! aborts the rest of the file.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{Snapshot, TitleObservation};
use crate::utils::normalize_title;

/// Marker line opening the failed-id block.
pub const FAILED_MARKER: &str = "==== FAILED IDS ====";

const HEADER_SEPARATOR: &str = " | ";
const URL_PREFIX: &str = " [URL:";
const MOBILE_PREFIX: &str = " [MOBILE:";

static RANK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\. (.*)$").expect("valid rank regex"));

/// Serialize a snapshot.
///
/// Titles are written in ascending order of their lowest rank; a title
/// without ranks is written as rank 1.
pub fn encode(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    for section in &snapshot.sources {
        match section.name.as_deref() {
            Some(name) if name != section.id => {
                out.push_str(&format!("{}{}{}\n", section.id, HEADER_SEPARATOR, name));
            }
            _ => {
                out.push_str(&section.id);
                out.push('\n');
            }
        }

        let mut lines: Vec<(u32, &str, &TitleObservation)> = section
            .titles()
            .map(|(title, obs)| (obs.min_rank().unwrap_or(1), title, obs))
            .collect();
        lines.sort_by_key(|(rank, _, _)| *rank);

        for (rank, title, obs) in lines {
            out.push_str(&format!("{}. {}", rank, title));
            if !obs.url.is_empty() {
                out.push_str(&format!("{}{}]", URL_PREFIX, obs.url));
            }
            if !obs.mobile_url.is_empty() {
                out.push_str(&format!("{}{}]", MOBILE_PREFIX, obs.mobile_url));
            }
            out.push('\n');
        }
        out.push('\n');
    }

    if !snapshot.failed_ids.is_empty() {
        out.push_str(FAILED_MARKER);
        out.push('\n');
        for id in &snapshot.failed_ids {
            out.push_str(id);
            out.push('\n');
        }
    }

    out
}

/// Parse a snapshot file's content under the given batch label.
pub fn decode(label: &str, content: &str) -> Snapshot {
    let content = content.replace("\r\n", "\n");
    let mut snapshot = Snapshot::new(label);

    for block in content.split("\n\n") {
        if block.trim().is_empty() {
            continue;
        }
        if block.contains(FAILED_MARKER) {
            snapshot.failed_ids.extend(parse_failed_block(block));
            continue;
        }

        let lines: Vec<&str> = block.trim().lines().collect();
        if lines.len() < 2 {
            continue;
        }

        let (id, name) = parse_header(lines[0]);
        let section = snapshot.source_mut(&id, name);

        for line in &lines[1..] {
            if line.trim().is_empty() {
                continue;
            }
            match parse_title_line(line) {
                Ok((title, observation)) => section.insert(title, observation),
                Err(e) => log::warn!("Skipping line in batch {}: {}", label, e),
            }
        }
    }

    snapshot
}

/// Parse raw file bytes. Lines that are not valid UTF-8 are logged and
/// skipped like any other malformed line.
pub fn decode_bytes(label: &str, bytes: &[u8]) -> Snapshot {
    let mut content = String::with_capacity(bytes.len());
    for raw in bytes.split(|&b| b == b'\n') {
        match std::str::from_utf8(raw) {
            Ok(line) => content.push_str(line),
            Err(e) => {
                let err = AppError::malformed(String::from_utf8_lossy(raw), e);
                log::warn!("Skipping line in batch {}: {}", label, err);
                continue;
            }
        }
        content.push('\n');
    }
    decode(label, &content)
}

/// Split a header into source id and optional display name.
pub fn parse_header(line: &str) -> (String, Option<String>) {
    let line = line.trim();
    match line.split_once(HEADER_SEPARATOR) {
        Some((id, name)) => (id.trim().to_string(), Some(name.trim().to_string())),
        None => (line.to_string(), None),
    }
}

/// Parse one `rank. title [URL:..] [MOBILE:..]` line.
pub fn parse_title_line(line: &str) -> Result<(String, TitleObservation)> {
    let mut rest = line.trim();
    let mut rank = None;

    // A prefix too large for u32 stays part of the title.
    if let Some(caps) = RANK_RE.captures(rest) {
        let digits = caps.get(1).map_or("", |m| m.as_str());
        if let Ok(value) = digits.parse::<u32>() {
            if value == 0 {
                return Err(AppError::malformed(line, "rank must be positive"));
            }
            rank = Some(value);
            rest = caps.get(2).map_or("", |m| m.as_str());
        }
    }

    let (rest, mobile_url) = split_suffix(rest, MOBILE_PREFIX);
    let (rest, url) = split_suffix(rest, URL_PREFIX);

    let title = normalize_title(rest);
    if title.is_empty() {
        return Err(AppError::malformed(line, "empty title"));
    }

    let observation = TitleObservation::new(vec![rank.unwrap_or(1)], url, mobile_url);
    Ok((title, observation))
}

/// Strip the last ` [PREFIX:value]` suffix.
///
/// The text before the prefix is always kept; the value is only taken
/// when the suffix is closed by `]`.
fn split_suffix<'a>(text: &'a str, prefix: &str) -> (&'a str, String) {
    match text.rsplit_once(prefix) {
        Some((head, tail)) => {
            let value = tail.strip_suffix(']').unwrap_or_default().to_string();
            (head, value)
        }
        None => (text, String::new()),
    }
}

fn parse_failed_block(block: &str) -> Vec<String> {
    block
        .lines()
        .skip_while(|l| !l.contains(FAILED_MARKER))
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
