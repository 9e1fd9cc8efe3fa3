//! Query command implementation.
//!
//! Runs query-box text (insert, filter pipeline, session, dump) against the
//! store through `QueryRunner`.

use chrono::Utc;
use vocab_core::query::QueryParseError;
use vocab_core::Position;
use vocab_store::{QueryReport, QueryRunner, RunError, VocabularyStore};

use super::{CommandContext, Result};
use crate::output::{format_created_entries, format_entries_json, format_entries_table};

/// Options for the query command.
#[derive(Debug)]
pub struct QueryOptions {
    /// Query text. Empty selects every word.
    pub text: String,
}

/// Executes the query command.
///
/// # Errors
///
/// Returns an error if the query is malformed, cannot be evaluated, or the
/// store fails.
pub async fn execute(ctx: &CommandContext, opts: &QueryOptions, store: &VocabularyStore) -> Result<()> {
    let mut runner = QueryRunner::new(store.clone());

    let report = match runner.execute(&opts.text).await {
        Ok(report) => report,
        Err(RunError::Parse(err)) => {
            if !ctx.json_output && !ctx.quiet {
                eprint!("{}", format_error_pointer(&opts.text, &err));
            }
            return Err(RunError::Parse(err).into());
        }
        Err(err) => return Err(err.into()),
    };

    print_report(ctx, &report)
}

fn print_report(ctx: &CommandContext, report: &QueryReport) -> Result<()> {
    match report {
        QueryReport::Dump(text) => println!("{text}"),
        QueryReport::Inserted(entries) | QueryReport::Listed(entries) if ctx.json_output => {
            println!("{}", format_entries_json(entries)?);
        }
        QueryReport::Inserted(entries) => {
            if !ctx.quiet {
                print!("{}", format_created_entries(entries, ctx.use_colors));
            }
        }
        QueryReport::Listed(entries) => {
            if !ctx.quiet {
                print!("{}", format_entries_table(entries, ctx.use_colors, Utc::now()));
            }
        }
        QueryReport::SessionReset(entries) => {
            if ctx.json_output {
                let output = serde_json::json!({
                    "status": "session_started",
                    "words": entries.len(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if !ctx.quiet {
                println!("New session started ({} words).", entries.len());
            }
        }
    }
    Ok(())
}

/// Renders the offending query line with a caret under the error position.
pub fn format_error_pointer(text: &str, err: &QueryParseError) -> String {
    let Position {
        row_begin,
        column_begin,
        ..
    } = err.position();
    let line = text.lines().nth(row_begin.saturating_sub(1)).unwrap_or("");
    format!(
        "  {line}\n  {}^\n",
        " ".repeat(column_begin.saturating_sub(1))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vocab_core::parse_query;
    use vocab_store::RecordStore;

    fn pointer(text: &str) -> String {
        let err = parse_query(text).unwrap_err();
        format_error_pointer(text, &err)
    }

    #[test]
    fn test_error_pointer_single_line() {
        assert_eq!(pointer("#verb and"), "  #verb and\n           ^\n");
    }

    #[test]
    fn test_error_pointer_second_line() {
        assert_eq!(pointer("#verb\n| limit(x)"), "  | limit(x)\n          ^\n");
    }

    #[tokio::test]
    async fn test_execute_insert_then_list() {
        let dir = tempdir().unwrap();
        let store = VocabularyStore::with_path(dir.path().join("vocabulary.json"));
        let ctx = CommandContext {
            json_output: false,
            use_colors: false,
            quiet: true,
            verbose: false,
        };

        let insert = QueryOptions {
            text: r#"insert "dog" #noun; "run(ning)" #verb"#.to_string(),
        };
        execute(&ctx, &insert, &store).await.unwrap();
        assert_eq!(store.size().await.unwrap(), 2);

        let list = QueryOptions {
            text: "#verb".to_string(),
        };
        execute(&ctx, &list, &store).await.unwrap();
    }

    #[tokio::test]
    async fn test_execute_parse_error() {
        let dir = tempdir().unwrap();
        let store = VocabularyStore::with_path(dir.path().join("vocabulary.json"));
        let ctx = CommandContext {
            json_output: true,
            use_colors: false,
            quiet: false,
            verbose: false,
        };
        let opts = QueryOptions {
            text: "frobnicate".to_string(),
        };
        let err = execute(&ctx, &opts, &store).await.unwrap_err();
        assert!(matches!(err, crate::commands::CommandError::Query(_)));
        assert!(!store.exists());
    }
}
