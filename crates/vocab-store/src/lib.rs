//! Persistent storage for a vocabulary collection.
//!
//! The collection is a key/value map of [`Word`]s kept in a single JSON file.
//! [`RecordStore`] is the interface the query engine's caller works through;
//! [`QueryRunner`] ties a store to the parser and evaluator of `vocab_core`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vocab_core::Word;

pub mod records;
pub mod runner;
pub mod store;

pub use records::RecordStore;
pub use runner::{QueryReport, QueryRunner, RunError};
pub use store::{Result, StoreError, VocabularyStore};

/// Current on-disk format version.
pub const VOCABULARY_VERSION: u32 = 1;

/// The whole stored collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// On-disk format version.
    pub version: u32,

    /// Words by key. Keys are time-ordered, so iteration order is creation
    /// order.
    #[serde(default)]
    pub records: BTreeMap<String, Word>,

    /// When the current review session started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_started: Option<DateTime<Utc>>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocabulary {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            version: VOCABULARY_VERSION,
            records: BTreeMap::new(),
            session_started: None,
        }
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no words.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the entry stored under `key`.
    pub fn entry(&self, key: &str) -> Option<Entry> {
        self.records
            .get(key)
            .map(|word| Entry::new(key.to_string(), word.clone()))
    }
}

/// A stored word together with its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The record key.
    pub key: String,

    /// The stored word.
    #[serde(flatten)]
    pub word: Word,
}

impl Entry {
    /// Creates an entry.
    pub fn new(key: String, word: Word) -> Self {
        Self { key, word }
    }

    /// The short form of the key shown in listings: its last eight
    /// characters, which are random.
    pub fn short_key(&self) -> &str {
        let start = self.key.len().saturating_sub(SHORT_KEY_LEN);
        self.key.get(start..).unwrap_or(&self.key)
    }
}

impl AsRef<Word> for Entry {
    fn as_ref(&self) -> &Word {
        &self.word
    }
}

/// Length of [`Entry::short_key`].
pub const SHORT_KEY_LEN: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::{ContentPiece, WordInfo};

    #[test]
    fn test_new_vocabulary_is_empty_and_current() {
        let vocabulary = Vocabulary::new();
        assert!(vocabulary.is_empty());
        assert_eq!(vocabulary.version, VOCABULARY_VERSION);
        assert_eq!(vocabulary.session_started, None);
    }

    #[test]
    fn test_entry_short_key() {
        let word = Word::new(WordInfo::default());
        let entry = Entry::new("0190c5f2e7a47c3a9b1d2e3f4a5b6c7d".to_string(), word.clone());
        assert_eq!(entry.short_key(), "4a5b6c7d");

        let entry = Entry::new("abc".to_string(), word);
        assert_eq!(entry.short_key(), "abc");
    }

    #[test]
    fn test_entry_serializes_flat() {
        let word = Word::new(WordInfo::new(
            vec![ContentPiece::Plain("dog".to_string())],
            "",
            Vec::<String>::new(),
        ));
        let json = serde_json::to_value(Entry::new("k1".to_string(), word)).unwrap();
        assert_eq!(json["key"], "k1");
        assert_eq!(json["content"][0]["text"], "dog");
        assert_eq!(json["review_count"], 0);
    }

    #[test]
    fn test_vocabulary_round_trip() {
        let mut vocabulary = Vocabulary::new();
        vocabulary.records.insert(
            "k1".to_string(),
            Word::new(WordInfo::new(
                vec![ContentPiece::Plain("dog".to_string())],
                "animal",
                ["noun"],
            )),
        );
        let json = serde_json::to_string(&vocabulary).unwrap();
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vocabulary);
    }
}
