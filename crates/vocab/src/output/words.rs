//! Word output formatting.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use vocab_core::markup::render_markup;
use vocab_store::Entry;

use super::helpers::{
    format_content, format_last_reviewed, format_reviewed, format_tags, pad, truncate_str,
};

const WORD_WIDTH: usize = 24;
const TAGS_WIDTH: usize = 15;
const DESCRIPTION_WIDTH: usize = 40;

/// JSON output structure for a list of words.
#[derive(Serialize)]
pub struct ListOutput<'a> {
    pub words: Vec<WordOutput<'a>>,
    pub total: usize,
}

/// JSON output structure for a single word.
#[derive(Serialize)]
pub struct WordOutput<'a> {
    pub key: &'a str,
    /// Content as markup, e.g. `run(ning)`.
    pub content: String,
    /// Content with every piece spelled out, e.g. `running`.
    pub text: String,
    pub description: &'a str,
    pub tags: &'a BTreeSet<String>,
    pub review_count: u32,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub reviewed: bool,
}

impl<'a> From<&'a Entry> for WordOutput<'a> {
    fn from(entry: &'a Entry) -> Self {
        let word = &entry.word;
        Self {
            key: &entry.key,
            content: render_markup(&word.info.content),
            text: word.content_text(),
            description: &word.info.description,
            tags: &word.info.tags,
            review_count: word.review_count,
            last_reviewed: word.last_reviewed,
            reviewed: word.reviewed,
        }
    }
}

/// Formats entries as JSON.
pub fn format_entries_json(entries: &[Entry]) -> Result<String, serde_json::Error> {
    let output = ListOutput {
        words: entries.iter().map(WordOutput::from).collect(),
        total: entries.len(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats entries as a table.
pub fn format_entries_table(entries: &[Entry], use_colors: bool, now: DateTime<Utc>) -> String {
    if entries.is_empty() {
        return "No words found.\n".to_string();
    }

    let mut output = String::new();

    let header = format!(
        "{:<8} {:<4} {:<1} {:<12} {:<tags$} {:<word$} {}",
        "Key",
        "Rev",
        "",
        "Last",
        "Tags",
        "Word",
        "Description",
        tags = TAGS_WIDTH,
        word = WORD_WIDTH,
    );
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for entry in entries {
        let word = &entry.word;
        let visible = render_markup(&word.info.content).chars().count();
        let content = pad(
            &format_content(&word.info.content, use_colors),
            visible,
            WORD_WIDTH,
        );
        let reviewed = pad(&format_reviewed(word.reviewed, use_colors), usize::from(word.reviewed), 1);

        let line = format!(
            "{:<8} {:<4} {} {:<12} {:<tags$} {} {}",
            entry.short_key(),
            word.review_count,
            reviewed,
            format_last_reviewed(word.last_reviewed, now),
            format_tags(&word.info.tags, TAGS_WIDTH),
            content,
            truncate_str(&word.info.description, DESCRIPTION_WIDTH),
            tags = TAGS_WIDTH,
        );
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output
}

/// Formats newly created entries as one confirmation line each.
pub fn format_created_entries(entries: &[Entry], use_colors: bool) -> String {
    let mut output = String::new();
    for entry in entries {
        let content = format_content(&entry.word.info.content, use_colors);
        output.push_str(&format!("Added: {} ({})\n", content, entry.short_key()));
    }
    output
}
