use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::load_config;
use commands::{resolve_store_path, CommandContext, CommandError};
use dispatch::{LocalCommand, LocalDispatch, StoreCommand, StoreDispatch};
use vocab_store::{StoreError, VocabularyStore};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                let rendered =
                    serde_json::to_string_pretty(&error_json).unwrap_or_else(|_| error_json.to_string());
                eprintln!("{rendered}");
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

/// Sets up stderr logging. `VOCAB_LOG` overrides the level picked from the
/// verbosity flags.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("VOCAB_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: &Cli) -> commands::Result<()> {
    // Config, completions and help never open the store
    if let Some(dispatch) = LocalDispatch::try_from_cli(cli) {
        let ctx = CommandContext::from_cli(cli);
        return dispatch.execute(&ctx);
    }

    let config = load_config()?;
    let ctx = CommandContext::from_cli(cli).with_config(&config);
    let path = resolve_store_path(cli, &config)?;
    tracing::debug!(path = %path.display(), "using vocabulary store");
    let store = VocabularyStore::with_path(path);

    match StoreDispatch::from_cli(cli, &config) {
        Some(dispatch) => dispatch.execute(&ctx, &store).await,
        None => Ok(()),
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Query(_) => "QUERY_ERROR",
        CommandError::Markup(_) => "MARKUP_ERROR",
        CommandError::Evaluate(_) => "EVALUATE_ERROR",
        CommandError::InvalidTag(_) => "INVALID_TAG",
        CommandError::Store(StoreError::NotFound { .. } | StoreError::AmbiguousKey { .. }) => {
            "NOT_FOUND"
        }
        CommandError::Store(_) => "STORE_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    ExitCode::from(exit_status(e))
}

/// 1 for bad input, 3 for file system failures, 4 for keys that don't
/// resolve, 5 for configuration and store format problems.
fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Query(_)
        | CommandError::Markup(_)
        | CommandError::Evaluate(_)
        | CommandError::InvalidTag(_)
        | CommandError::Json(_) => 1,
        CommandError::Io(_) => 3,
        CommandError::Store(err) => match err {
            StoreError::ReadError { .. }
            | StoreError::WriteError { .. }
            | StoreError::CreateDirError { .. }
            | StoreError::DeleteError { .. } => 3,
            StoreError::NotFound { .. } | StoreError::AmbiguousKey { .. } => 4,
            StoreError::NoDataDir | StoreError::Json(_) | StoreError::UnsupportedVersion { .. } => 5,
        },
        CommandError::Config(_) => 5,
    }
}
