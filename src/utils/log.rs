// src/utils/log.rs

//! Run-level report logging with server-style sections.
//!
//! Thin helpers over the `log` facade so run headers, steps and summaries
//! share one layout and obey the configured log filter.

/// Width of header borders.
const RULE_WIDTH: usize = 60;

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(RULE_WIDTH);
    ::log::info!("{}", border);
    ::log::info!("  {}", title);
    ::log::info!("{}", border);
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    ::log::info!("{}", format_step(step_num, total, message));
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    ::log::info!("    {}", message);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    ::log::info!("[SUMMARY] {}", title);
    for line in format_items(items) {
        ::log::info!("{}", line);
    }
}

fn format_step(step_num: usize, total: usize, message: &str) -> String {
    format!("[STEP {}/{}] {}", step_num, total, message)
}

fn format_items(items: &[(&str, String)]) -> Vec<String> {
    items
        .iter()
        .map(|(key, value)| format!("    {}: {}", key, value))
        .collect()
}
