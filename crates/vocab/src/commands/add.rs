//! Add command implementation.
//!
//! Parses the content markup, builds the word the same way an `insert` query
//! does, and stores it.

use vocab_core::markup::parse_markup;
use vocab_core::query::QueryEvaluator;
use vocab_core::WordInfo;
use vocab_store::{Entry, RecordStore};

use super::{validate_tags, CommandContext, Result};
use crate::output::{format_created_entries, format_entries_json};

/// Options for the add command.
#[derive(Debug)]
pub struct AddOptions {
    /// Word content as markup.
    pub content: String,
    /// Description or translation.
    pub description: Option<String>,
    /// Tags to attach.
    pub tags: Vec<String>,
}

/// Validates the options and stores the new word.
pub async fn add_word<S: RecordStore>(store: &S, opts: &AddOptions) -> Result<Vec<Entry>> {
    validate_tags(&opts.tags)?;
    let content = parse_markup(&opts.content)?;
    let info = WordInfo::new(
        content,
        opts.description.clone().unwrap_or_default(),
        opts.tags.iter().cloned(),
    );

    let words = QueryEvaluator::new().insert(&[info])?;
    Ok(store.create_records(words).await?)
}

/// Executes the add command.
///
/// # Errors
///
/// Returns an error if a tag is invalid, the content is empty or has
/// unbalanced parentheses, or the store fails.
pub async fn execute<S: RecordStore>(ctx: &CommandContext, opts: &AddOptions, store: &S) -> Result<()> {
    let created = add_word(store, opts).await?;

    if ctx.json_output {
        println!("{}", format_entries_json(&created)?);
    } else if !ctx.quiet {
        print!("{}", format_created_entries(&created, ctx.use_colors));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandError;
    use tempfile::tempdir;
    use vocab_core::ContentPiece;
    use vocab_store::VocabularyStore;

    fn options(content: &str, tags: &[&str]) -> AddOptions {
        AddOptions {
            content: content.to_string(),
            description: Some("to move fast".to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_add_word() {
        let dir = tempdir().unwrap();
        let store = VocabularyStore::with_path(dir.path().join("vocabulary.json"));

        let created = add_word(&store, &options("run(ning)", &["verb"])).await.unwrap();
        assert_eq!(created.len(), 1);
        let entry = &created[0];
        assert_eq!(
            entry.word.info.content,
            vec![
                ContentPiece::Plain("run".to_string()),
                ContentPiece::Optional("ning".to_string()),
            ]
        );
        assert_eq!(entry.word.info.description, "to move fast");
        assert!(entry.word.has_tag("verb"));
        assert_eq!(entry.word.review_count, 0);
        assert_eq!(&store.get(&entry.key).await.unwrap(), entry);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let dir = tempdir().unwrap();
        let store = VocabularyStore::with_path(dir.path().join("vocabulary.json"));

        assert!(matches!(
            add_word(&store, &options("run(ning", &[])).await,
            Err(CommandError::Markup(_))
        ));
        assert!(matches!(
            add_word(&store, &options("", &[])).await,
            Err(CommandError::Evaluate(_))
        ));
        assert!(matches!(
            add_word(&store, &options("dog", &["a|b"])).await,
            Err(CommandError::InvalidTag(_))
        ));
        assert!(!store.exists());
    }
}
