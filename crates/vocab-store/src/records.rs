//! Record-level operations on the stored collection.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use vocab_core::{Word, WordInfo};

use crate::store::{Result, StoreError, VocabularyStore};
use crate::{Entry, Vocabulary};

/// Key/value access to a word collection.
///
/// Listings are in storage order, which is creation order.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Returns a snapshot of the records, optionally keeping only those that
    /// satisfy `predicate`.
    async fn list_records(&self, predicate: Option<&dyn Fn(&Word) -> bool>) -> Result<Vec<Entry>>;

    /// Persists new words under fresh keys and returns them as stored.
    async fn create_records(&self, words: Vec<Word>) -> Result<Vec<Entry>>;

    /// Clears the per-session reviewed flag of every word.
    async fn reset_session(&self) -> Result<()>;

    /// Returns a full textual export of the collection.
    async fn export_all(&self) -> Result<String>;

    /// Returns the record stored under `key`.
    async fn get(&self, key: &str) -> Result<Entry>;

    /// Marks a word reviewed at `now`. The flag tells whether anything
    /// changed: a word is reviewed at most once per session.
    async fn review(&self, key: &str, now: DateTime<Utc>) -> Result<(Entry, bool)>;

    /// Replaces the user-authored fields of a word, keeping its review state.
    async fn update(&self, key: &str, info: WordInfo) -> Result<Entry>;

    /// Deletes a word and returns it.
    async fn remove(&self, key: &str) -> Result<Entry>;

    /// Number of stored words.
    async fn size(&self) -> Result<usize>;

    /// Expands a full key, a unique key prefix, or a unique short key (see
    /// [`Entry::short_key`]) to the full key.
    async fn resolve_key(&self, key: &str) -> Result<String>;
}

impl RecordStore for VocabularyStore {
    async fn list_records(&self, predicate: Option<&dyn Fn(&Word) -> bool>) -> Result<Vec<Entry>> {
        let vocabulary = self.load_or_default_async().await?;
        Ok(vocabulary
            .records
            .into_iter()
            .filter(|(_, word)| predicate.map_or(true, |predicate| predicate(word)))
            .map(|(key, word)| Entry::new(key, word))
            .collect())
    }

    async fn create_records(&self, words: Vec<Word>) -> Result<Vec<Entry>> {
        let mut vocabulary = self.load_or_default_async().await?;
        let mut entries = Vec::with_capacity(words.len());
        for word in words {
            let key = new_key();
            vocabulary.records.insert(key.clone(), word.clone());
            entries.push(Entry::new(key, word));
        }
        self.save_async(&vocabulary).await?;
        tracing::debug!(created = entries.len(), "created records");
        Ok(entries)
    }

    async fn reset_session(&self) -> Result<()> {
        let mut vocabulary = self.load_or_default_async().await?;
        for word in vocabulary.records.values_mut() {
            word.reset_session();
        }
        vocabulary.session_started = Some(Utc::now());
        self.save_async(&vocabulary).await?;
        tracing::debug!(words = vocabulary.len(), "started new session");
        Ok(())
    }

    async fn export_all(&self) -> Result<String> {
        let vocabulary = self.load_or_default_async().await?;
        Ok(serde_json::to_string_pretty(&vocabulary)?)
    }

    async fn get(&self, key: &str) -> Result<Entry> {
        let vocabulary = self.load_or_default_async().await?;
        vocabulary.entry(key).ok_or_else(|| StoreError::not_found(key))
    }

    async fn review(&self, key: &str, now: DateTime<Utc>) -> Result<(Entry, bool)> {
        let mut vocabulary = self.load_or_default_async().await?;
        let word = vocabulary
            .records
            .get_mut(key)
            .ok_or_else(|| StoreError::not_found(key))?;
        let changed = word.review(now);
        let entry = Entry::new(key.to_string(), word.clone());
        if changed {
            self.save_async(&vocabulary).await?;
        }
        Ok((entry, changed))
    }

    async fn update(&self, key: &str, info: WordInfo) -> Result<Entry> {
        let mut vocabulary = self.load_or_default_async().await?;
        let word = vocabulary
            .records
            .get_mut(key)
            .ok_or_else(|| StoreError::not_found(key))?;
        word.apply(info);
        let entry = Entry::new(key.to_string(), word.clone());
        self.save_async(&vocabulary).await?;
        Ok(entry)
    }

    async fn remove(&self, key: &str) -> Result<Entry> {
        let mut vocabulary = self.load_or_default_async().await?;
        let word = vocabulary
            .records
            .remove(key)
            .ok_or_else(|| StoreError::not_found(key))?;
        self.save_async(&vocabulary).await?;
        Ok(Entry::new(key.to_string(), word))
    }

    async fn size(&self) -> Result<usize> {
        Ok(self.load_or_default_async().await?.len())
    }

    async fn resolve_key(&self, key: &str) -> Result<String> {
        let vocabulary = self.load_or_default_async().await?;
        resolve_key(&vocabulary, key)
    }
}

/// UUIDv7 keys are monotonic within a process, so key order is creation
/// order.
fn new_key() -> String {
    Uuid::now_v7().simple().to_string()
}

fn resolve_key(vocabulary: &Vocabulary, key: &str) -> Result<String> {
    if vocabulary.records.contains_key(key) {
        return Ok(key.to_string());
    }
    if key.is_empty() {
        return Err(StoreError::not_found(key));
    }

    let mut matches = vocabulary
        .records
        .keys()
        .filter(|candidate| candidate.starts_with(key) || candidate.ends_with(key));
    match (matches.next(), matches.next()) {
        (Some(found), None) => Ok(found.clone()),
        (None, _) => Err(StoreError::not_found(key)),
        (Some(_), Some(_)) => Err(StoreError::AmbiguousKey {
            key: key.to_string(),
            count: 2 + matches.count(),
        }),
    }
}
