//! Utility functions shared by the screener and its notifiers.

use regex::Regex;
use std::sync::LazyLock;

/// Split text into consecutive chunks of at most `max_chars` characters.
///
/// Counts Unicode scalar values, not bytes, so a chunk never ends inside a
/// multi-byte character. Empty input yields no chunks; `max_chars == 0` is
/// treated as 1.
pub fn split_chars(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        if count == max_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", s[..idx].trim_end()),
        None => s.to_string(),
    }
}

static BOT_TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/bot[0-9]+:[A-Za-z0-9_-]+").unwrap());

/// Redact bot tokens embedded in Bot API URLs before logging.
pub fn sanitize_for_log(s: &str) -> String {
    BOT_TOKEN_PATTERN
        .replace_all(s, "/bot***REDACTED***")
        .into_owned()
}
