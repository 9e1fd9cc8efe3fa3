//! Delete command implementation.
//!
//! Resolves every key before deleting anything, then asks for confirmation
//! unless `--force` is given.

use serde::Serialize;
use vocab_store::{Entry, RecordStore};

use super::{confirm_bulk_operation, CommandContext, CommandError, ConfirmResult, Result};

/// Options for the delete command.
#[derive(Debug)]
pub struct DeleteOptions {
    /// Word keys (full keys, prefixes or short keys).
    pub keys: Vec<String>,
    /// Skip confirmation prompt.
    pub force: bool,
}

/// Resolves `keys` to the stored entries, dropping repeats.
pub async fn resolve_entries<S: RecordStore>(store: &S, keys: &[String]) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = Vec::with_capacity(keys.len());
    for key in keys {
        let key = store.resolve_key(key).await?;
        if entries.iter().all(|e| e.key != key) {
            entries.push(store.get(&key).await?);
        }
    }
    Ok(entries)
}

/// Removes the given entries and returns what was removed.
pub async fn delete_entries<S: RecordStore>(store: &S, entries: &[Entry]) -> Result<Vec<Entry>> {
    let mut removed = Vec::with_capacity(entries.len());
    for entry in entries {
        removed.push(store.remove(&entry.key).await?);
    }
    Ok(removed)
}

/// Executes the delete command.
///
/// # Errors
///
/// Returns an error if a key does not resolve to one word, confirmation is
/// needed but no terminal is attached, or the store fails.
pub async fn execute<S: RecordStore>(ctx: &CommandContext, opts: &DeleteOptions, store: &S) -> Result<()> {
    let entries = resolve_entries(store, &opts.keys).await?;

    let items: Vec<(&str, String)> = entries
        .iter()
        .map(|e| (e.short_key(), e.word.content_text()))
        .collect();

    match confirm_bulk_operation("delete", &items, opts.force, ctx.quiet)? {
        ConfirmResult::Confirmed => {}
        ConfirmResult::Aborted => {
            if !ctx.quiet {
                eprintln!("Aborted.");
            }
            return Ok(());
        }
    }

    let removed = delete_entries(store, &entries).await?;

    if ctx.json_output {
        println!("{}", format_delete_results_json(&removed)?);
    } else if !ctx.quiet {
        for entry in &removed {
            println!("Deleted: {} ({})", entry.word.content_text(), entry.short_key());
        }
        if ctx.verbose && removed.len() > 1 {
            println!("\n{} deleted", removed.len());
        }
    }

    Ok(())
}

/// Formats delete results as JSON.
fn format_delete_results_json(removed: &[Entry]) -> Result<String> {
    #[derive(Serialize)]
    struct DeleteOutput<'a> {
        deleted: Vec<DeletedWordOutput<'a>>,
        total_deleted: usize,
    }

    #[derive(Serialize)]
    struct DeletedWordOutput<'a> {
        key: &'a str,
        text: String,
    }

    let output = DeleteOutput {
        deleted: removed
            .iter()
            .map(|e| DeletedWordOutput {
                key: &e.key,
                text: e.word.content_text(),
            })
            .collect(),
        total_deleted: removed.len(),
    };

    serde_json::to_string_pretty(&output).map_err(CommandError::from)
}
