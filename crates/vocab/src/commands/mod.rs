//! Command implementations for the vocab CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod add;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod query;
pub mod review;
pub mod session;

use std::env;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use dialoguer::Confirm;
use vocab_core::query::{EvaluateError, QueryParseError};
use vocab_core::{is_valid_tag, MarkupError};
use vocab_store::{RunError, StoreError, VocabularyStore};

use crate::cli::Cli;
use config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Malformed query text.
    #[error("query error: {0}")]
    Query(#[from] QueryParseError),

    /// Word content with unbalanced parentheses.
    #[error("invalid content: {0}")]
    Markup(#[from] MarkupError),

    /// A query that parsed but could not be evaluated.
    #[error("query error: {0}")]
    Evaluate(#[from] EvaluateError),

    /// A tag with forbidden characters.
    #[error("invalid tag '{0}': tags cannot be empty or contain whitespace or any of # ; | , ( ) \" :")]
    InvalidTag(String),

    /// Store error.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<RunError> for CommandError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Parse(err) => CommandError::Query(err),
            RunError::Evaluate(err) => CommandError::Evaluate(err),
            RunError::Store(err) => CommandError::Store(err),
        }
    }
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && env::var_os("NO_COLOR").is_none(),
            quiet: cli.quiet,
            verbose: cli.verbose,
        }
    }

    /// Applies output preferences from the config file. Flags still win.
    pub fn with_config(mut self, config: &Config) -> Self {
        if config.output.color == Some(false) {
            self.use_colors = false;
        }
        self
    }
}

/// Resolves the vocabulary file: `--store` flag or `VOCAB_STORE`, then the
/// config file, then the XDG data directory.
pub fn resolve_store_path(cli: &Cli, config: &Config) -> Result<PathBuf> {
    if let Some(path) = &cli.store {
        return Ok(path.clone());
    }
    if let Some(path) = &config.store.path {
        return Ok(path.clone());
    }
    Ok(VocabularyStore::default_path()?)
}

/// Rejects tags the query language could not address.
pub fn validate_tags<'a>(tags: impl IntoIterator<Item = &'a String>) -> Result<()> {
    match tags.into_iter().find(|tag| !is_valid_tag(tag)) {
        Some(tag) => Err(CommandError::InvalidTag(tag.clone())),
        None => Ok(()),
    }
}

/// Outcome of a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResult {
    Confirmed,
    Aborted,
}

/// Asks before a destructive operation on `items` (`(short key, word)` pairs).
///
/// `force` skips the prompt. Without a terminal there is nobody to ask, so
/// the operation is refused unless forced.
pub fn confirm_bulk_operation(
    action: &str,
    items: &[(&str, String)],
    force: bool,
    quiet: bool,
) -> Result<ConfirmResult> {
    if force || items.is_empty() {
        return Ok(ConfirmResult::Confirmed);
    }

    if !io::stdin().is_terminal() {
        return Err(CommandError::Config(format!(
            "refusing to {action} without confirmation; pass --force"
        )));
    }

    if !quiet {
        eprintln!("About to {action} {} word(s):", items.len());
        for (key, content) in items {
            eprintln!("  {key}  {content}");
        }
    }

    let confirmed = Confirm::new()
        .with_prompt(format!("{action} {} word(s)?", items.len()))
        .default(false)
        .interact()
        .map_err(|e| CommandError::Io(io::Error::other(e.to_string())))?;

    Ok(if confirmed {
        ConfirmResult::Confirmed
    } else {
        ConfirmResult::Aborted
    })
}
