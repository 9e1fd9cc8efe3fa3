//! List command implementation.
//!
//! Lists words in storage order. For anything more selective, use a query.

use chrono::Utc;
use vocab_core::Word;
use vocab_store::{Entry, RecordStore};

use super::{CommandContext, Result};
use crate::output::{format_entries_json, format_entries_table};

/// Options for the list command.
#[derive(Debug, Default)]
pub struct ListOptions {
    /// Limit results.
    pub limit: Option<usize>,
    /// Show only words not reviewed in the current session.
    pub unreviewed: bool,
}

/// Loads the words selected by `opts`.
pub async fn list_words<S: RecordStore>(store: &S, opts: &ListOptions) -> Result<Vec<Entry>> {
    let unreviewed = |word: &Word| !word.reviewed;
    let predicate: Option<&dyn Fn(&Word) -> bool> = if opts.unreviewed {
        Some(&unreviewed)
    } else {
        None
    };

    let mut entries = store.list_records(predicate).await?;
    if let Some(limit) = opts.limit {
        entries.truncate(limit);
    }
    Ok(entries)
}

/// Executes the list command.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn execute<S: RecordStore>(ctx: &CommandContext, opts: &ListOptions, store: &S) -> Result<()> {
    let entries = list_words(store, opts).await?;

    if ctx.json_output {
        println!("{}", format_entries_json(&entries)?);
    } else if !ctx.quiet {
        print!("{}", format_entries_table(&entries, ctx.use_colors, Utc::now()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vocab_core::{ContentPiece, WordInfo};
    use vocab_store::VocabularyStore;

    async fn store_with(words: &[&str]) -> (tempfile::TempDir, VocabularyStore, Vec<Entry>) {
        let dir = tempdir().unwrap();
        let store = VocabularyStore::with_path(dir.path().join("vocabulary.json"));
        let words = words
            .iter()
            .map(|w| {
                Word::new(WordInfo::new(
                    vec![ContentPiece::Plain(w.to_string())],
                    "",
                    Vec::<String>::new(),
                ))
            })
            .collect();
        let created = store.create_records(words).await.unwrap();
        (dir, store, created)
    }

    fn contents(entries: &[Entry]) -> Vec<String> {
        entries.iter().map(|e| e.word.content_text()).collect()
    }

    #[tokio::test]
    async fn test_list_all_in_storage_order() {
        let (_dir, store, _) = store_with(&["b", "a", "c"]).await;
        let entries = list_words(&store, &ListOptions::default()).await.unwrap();
        assert_eq!(contents(&entries), vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_list_limit() {
        let (_dir, store, _) = store_with(&["b", "a", "c"]).await;
        let opts = ListOptions {
            limit: Some(2),
            ..Default::default()
        };
        assert_eq!(contents(&list_words(&store, &opts).await.unwrap()), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_list_unreviewed() {
        let (_dir, store, created) = store_with(&["b", "a", "c"]).await;
        store.review(&created[1].key, Utc::now()).await.unwrap();
        let opts = ListOptions {
            unreviewed: true,
            ..Default::default()
        };
        assert_eq!(contents(&list_words(&store, &opts).await.unwrap()), vec!["b", "c"]);
    }
}
