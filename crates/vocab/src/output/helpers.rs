//! Common helper functions for output formatting.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use vocab_core::ContentPiece;

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Formats word content as markup, dimming the optional parts.
pub fn format_content(pieces: &[ContentPiece], use_colors: bool) -> String {
    pieces
        .iter()
        .map(|piece| match piece {
            ContentPiece::Plain(text) => text.clone(),
            ContentPiece::Optional(text) => {
                let part = format!("({text})");
                if use_colors {
                    part.dimmed().to_string()
                } else {
                    part
                }
            }
        })
        .collect()
}

/// Formats tags for display.
pub fn format_tags(tags: &BTreeSet<String>, max_len: usize) -> String {
    if tags.is_empty() {
        return String::new();
    }

    let formatted: Vec<String> = tags.iter().map(|t| format!("#{t}")).collect();
    truncate_str(&formatted.join(" "), max_len)
}

/// Formats the time since a word was last reviewed.
pub fn format_last_reviewed(last_reviewed: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = last_reviewed else {
        return "never".to_string();
    };

    match (now - at).num_days() {
        i64::MIN..=0 => "today".to_string(),
        1 => "1 day ago".to_string(),
        days => format!("{days} days ago"),
    }
}

/// The reviewed mark shown in tables.
pub fn format_reviewed(reviewed: bool, use_colors: bool) -> String {
    match (reviewed, use_colors) {
        (true, true) => "✓".green().to_string(),
        (true, false) => "✓".to_string(),
        (false, _) => String::new(),
    }
}

/// Pads `text` to `width` columns. Colored text carries escape codes, so
/// its visible length is passed in.
pub fn pad(text: &str, visible_len: usize, width: usize) -> String {
    let padding = width.saturating_sub(visible_len);
    format!("{text}{}", " ".repeat(padding))
}
