//! Session command implementation.
//!
//! Starts a new review session. Same effect as the `session` query.

use vocab_store::RecordStore;

use super::{CommandContext, Result};

/// Starts a new session and returns how many words it covers.
pub async fn start_session<S: RecordStore>(store: &S) -> Result<usize> {
    store.reset_session().await?;
    Ok(store.size().await?)
}

/// Executes the session command.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub async fn execute<S: RecordStore>(ctx: &CommandContext, store: &S) -> Result<()> {
    let words = start_session(store).await?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "session_started",
            "words": words,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("New session started ({words} words).");
    }

    Ok(())
}
