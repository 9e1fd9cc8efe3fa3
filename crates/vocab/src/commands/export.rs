//! Export command implementation.
//!
//! Writes the full dump of the collection to a file or stdout.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use vocab_store::RecordStore;

use super::{CommandContext, Result};

/// Options for the export command.
#[derive(Debug)]
pub struct ExportOptions {
    /// Output file. `None` picks a timestamped name, `-` means stdout.
    pub output: Option<PathBuf>,
}

/// Default export file name for `now`, e.g. `2024-06-15T120000Z.json`.
pub fn default_export_path(now: DateTime<Utc>) -> PathBuf {
    PathBuf::from(format!("{}.json", now.format("%Y-%m-%dT%H%M%SZ")))
}

/// Executes the export command.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the file cannot be
/// written.
pub async fn execute<S: RecordStore>(ctx: &CommandContext, opts: &ExportOptions, store: &S) -> Result<()> {
    let dump = store.export_all().await?;

    let path = match &opts.output {
        Some(path) if path == Path::new("-") => {
            println!("{dump}");
            return Ok(());
        }
        Some(path) => path.clone(),
        None => default_export_path(Utc::now()),
    };

    fs::write(&path, &dump)?;
    tracing::debug!(path = %path.display(), bytes = dump.len(), "exported vocabulary");

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "path": path.display().to_string(),
            "words": store.size().await?,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Exported to {}", path.display());
    }

    Ok(())
}
