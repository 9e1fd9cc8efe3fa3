//! Edit command implementation.
//!
//! Replaces the user-authored fields of a word. Review state is kept.

use vocab_core::markup::parse_markup;
use vocab_core::query::EvaluateError;
use vocab_store::{Entry, RecordStore};

use super::{validate_tags, CommandContext, Result};
use crate::output::format_entries_json;
use crate::output::helpers::format_content;

/// Options for the edit command.
#[derive(Debug, Default)]
pub struct EditOptions {
    /// Word key (full key, prefix or short key).
    pub key: String,
    /// New content as markup.
    pub content: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Set tags (replaces existing).
    pub tags: Vec<String>,
    /// Add a single tag.
    pub add_tag: Option<String>,
    /// Remove a single tag.
    pub remove_tag: Option<String>,
}

impl EditOptions {
    fn has_changes(&self) -> bool {
        self.content.is_some()
            || self.description.is_some()
            || !self.tags.is_empty()
            || self.add_tag.is_some()
            || self.remove_tag.is_some()
    }
}

/// Result of a successful edit operation.
#[derive(Debug)]
pub struct EditResult {
    /// The word as stored after the edit.
    pub entry: Entry,
    /// Fields that were updated.
    pub updated_fields: Vec<&'static str>,
}

/// Applies `opts` to the stored word. Returns `None` if there was nothing
/// to change.
pub async fn edit_word<S: RecordStore>(store: &S, opts: &EditOptions) -> Result<Option<EditResult>> {
    let key = store.resolve_key(&opts.key).await?;
    if !opts.has_changes() {
        return Ok(None);
    }

    let mut info = store.get(&key).await?.word.info;
    let mut updated_fields = Vec::new();

    if let Some(content) = &opts.content {
        let pieces = parse_markup(content)?;
        if pieces.is_empty() {
            return Err(EvaluateError::EmptyContent { index: 0 }.into());
        }
        info.content = pieces;
        updated_fields.push("content");
    }

    if let Some(description) = &opts.description {
        info.description = description.clone();
        updated_fields.push("description");
    }

    if !opts.tags.is_empty() {
        validate_tags(&opts.tags)?;
        info.tags = opts.tags.iter().cloned().collect();
        updated_fields.push("tags");
    }
    if let Some(tag) = &opts.add_tag {
        validate_tags([tag])?;
        info.tags.insert(tag.clone());
        updated_fields.push("tags");
    }
    if let Some(tag) = &opts.remove_tag {
        info.tags.remove(tag);
        updated_fields.push("tags");
    }
    updated_fields.dedup();

    let entry = store.update(&key, info).await?;
    Ok(Some(EditResult {
        entry,
        updated_fields,
    }))
}

/// Executes the edit command.
///
/// # Errors
///
/// Returns an error if the key does not resolve to one word, the new
/// content or tags are invalid, or the store fails.
pub async fn execute<S: RecordStore>(ctx: &CommandContext, opts: &EditOptions, store: &S) -> Result<()> {
    let Some(result) = edit_word(store, opts).await? else {
        if ctx.json_output {
            let output = serde_json::json!({
                "status": "unchanged",
                "message": "No changes specified",
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else if !ctx.quiet {
            println!("No changes specified for word {}", opts.key);
        }
        return Ok(());
    };

    if ctx.json_output {
        println!("{}", format_entries_json(std::slice::from_ref(&result.entry))?);
    } else if !ctx.quiet {
        println!(
            "Updated: {} ({}): {}",
            format_content(&result.entry.word.info.content, ctx.use_colors),
            result.entry.short_key(),
            result.updated_fields.join(", ")
        );
    }

    Ok(())
}
