//! Review command implementation.
//!
//! Marks words reviewed for the current session. A word counts once per
//! session; reviewing it again is reported but changes nothing.

use chrono::{DateTime, Utc};
use serde::Serialize;
use vocab_store::{Entry, RecordStore};

use super::{CommandContext, CommandError, Result};
use crate::output::helpers::format_content;

/// Options for the review command.
#[derive(Debug)]
pub struct ReviewOptions {
    /// Word keys (full keys, prefixes or short keys).
    pub keys: Vec<String>,
}

/// Result of reviewing a single word.
#[derive(Debug)]
pub struct ReviewResult {
    /// The word after the review.
    pub entry: Entry,
    /// False if the word was already reviewed in this session.
    pub counted: bool,
}

/// Resolves every key first, then reviews the words at `now`.
///
/// Nothing is reviewed if any key fails to resolve.
pub async fn review_words<S: RecordStore>(
    store: &S,
    keys: &[String],
    now: DateTime<Utc>,
) -> Result<Vec<ReviewResult>> {
    let mut resolved = Vec::with_capacity(keys.len());
    for key in keys {
        resolved.push(store.resolve_key(key).await?);
    }

    let mut results = Vec::with_capacity(resolved.len());
    for key in &resolved {
        let (entry, counted) = store.review(key, now).await?;
        results.push(ReviewResult { entry, counted });
    }
    Ok(results)
}

/// Executes the review command.
///
/// # Errors
///
/// Returns an error if a key matches no word or several words, or the store
/// fails.
pub async fn execute<S: RecordStore>(ctx: &CommandContext, opts: &ReviewOptions, store: &S) -> Result<()> {
    let results = review_words(store, &opts.keys, Utc::now()).await?;

    if ctx.json_output {
        println!("{}", format_review_results_json(&results)?);
    } else if !ctx.quiet {
        for result in &results {
            let content = format_content(&result.entry.word.info.content, ctx.use_colors);
            let key = result.entry.short_key();
            if result.counted {
                println!(
                    "Reviewed: {} ({}), {} review(s)",
                    content, key, result.entry.word.review_count
                );
            } else {
                println!("Already reviewed this session: {} ({})", content, key);
            }
        }
    }

    Ok(())
}

/// Formats review results as JSON.
fn format_review_results_json(results: &[ReviewResult]) -> Result<String> {
    #[derive(Serialize)]
    struct ReviewOutput<'a> {
        key: &'a str,
        text: String,
        counted: bool,
        review_count: u32,
    }

    let output: Vec<ReviewOutput> = results
        .iter()
        .map(|r| ReviewOutput {
            key: &r.entry.key,
            text: r.entry.word.content_text(),
            counted: r.counted,
            review_count: r.entry.word.review_count,
        })
        .collect();

    serde_json::to_string_pretty(&output).map_err(CommandError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vocab_core::{ContentPiece, Word, WordInfo};
    use vocab_store::{StoreError, VocabularyStore};

    async fn store_with_dog() -> (tempfile::TempDir, VocabularyStore, Entry) {
        let dir = tempdir().unwrap();
        let store = VocabularyStore::with_path(dir.path().join("vocabulary.json"));
        let word = Word::new(WordInfo::new(
            vec![ContentPiece::Plain("dog".to_string())],
            "",
            ["noun"],
        ));
        let mut created = store.create_records(vec![word]).await.unwrap();
        (dir, store, created.remove(0))
    }

    #[tokio::test]
    async fn test_review_by_short_key_counts_once() {
        let (_dir, store, entry) = store_with_dog().await;
        let keys = vec![entry.short_key().to_string()];

        let first = review_words(&store, &keys, Utc::now()).await.unwrap();
        assert!(first[0].counted);
        assert_eq!(first[0].entry.word.review_count, 1);

        let second = review_words(&store, &keys, Utc::now()).await.unwrap();
        assert!(!second[0].counted);
        assert_eq!(second[0].entry.word.review_count, 1);
    }

    #[tokio::test]
    async fn test_unknown_key_reviews_nothing() {
        let (_dir, store, entry) = store_with_dog().await;
        let keys = vec![entry.key.clone(), "zzzz".to_string()];

        let err = review_words(&store, &keys, Utc::now()).await.unwrap_err();
        assert!(matches!(err, CommandError::Store(StoreError::NotFound { .. })));
        assert!(!store.get(&entry.key).await.unwrap().word.reviewed);
    }

    #[test]
    fn test_format_review_results_json() {
        let mut word = Word::new(WordInfo::new(
            vec![ContentPiece::Plain("dog".to_string())],
            "",
            Vec::<String>::new(),
        ));
        word.review(Utc::now());
        let results = vec![ReviewResult {
            entry: Entry::new("abc".to_string(), word),
            counted: true,
        }];

        let json = format_review_results_json(&results).unwrap();
        assert!(json.contains("\"counted\": true"));
        assert!(json.contains("\"review_count\": 1"));
        assert!(json.contains("\"text\": \"dog\""));
    }
}
