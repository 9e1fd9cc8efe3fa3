//! Vocabulary file storage with XDG path support.
//!
//! The collection is stored as pretty-printed JSON at
//! `~/.local/share/vocab/vocabulary.json` on Linux.
//!
//! Both synchronous and asynchronous I/O methods are provided:
//! - `save()`, `load()` - Synchronous methods using `std::fs`
//! - `save_async()`, `load_async()` - Asynchronous methods using `tokio::fs`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;

use crate::{Vocabulary, VOCABULARY_VERSION};

/// Default vocabulary filename.
const VOCABULARY_FILENAME: &str = "vocabulary.json";

/// Application qualifier (for XDG paths).
const QUALIFIER: &str = "";

/// Application organization (for XDG paths).
const ORGANIZATION: &str = "";

/// Application name (for XDG paths).
const APPLICATION: &str = "vocab";

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to determine the XDG data directory.
    #[error("failed to determine data directory: no valid home directory found")]
    NoDataDir,

    /// I/O error during file read.
    #[error("failed to read vocabulary file '{path}': {source}")]
    ReadError {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during file write.
    #[error("failed to write vocabulary file '{path}': {source}")]
    WriteError {
        /// The path that failed to write.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during directory creation.
    #[error("failed to create data directory '{path}': {source}")]
    CreateDirError {
        /// The directory path that failed to create.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during file delete.
    #[error("failed to delete vocabulary file '{path}': {source}")]
    DeleteError {
        /// The path that failed to delete.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file was written by a newer version.
    #[error("unsupported vocabulary file version {found} (this build reads up to {supported})")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Highest version this build understands.
        supported: u32,
    },

    /// No record matches the key.
    #[error("no word found for key '{key}'")]
    NotFound {
        /// The key or key fragment that was looked up.
        key: String,
    },

    /// More than one record matches a key fragment.
    #[error("key '{key}' is ambiguous: matches {count} words")]
    AmbiguousKey {
        /// The key fragment.
        key: String,
        /// How many records it matches.
        count: usize,
    },
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        StoreError::NotFound { key: key.into() }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistent storage for the vocabulary.
///
/// `VocabularyStore` reads and writes the whole collection as one JSON file.
/// Writes are atomic (temp file + rename), but there is no locking: two
/// processes saving at once can lose one of the updates.
///
/// # Example
///
/// ```no_run
/// use vocab_store::{Vocabulary, VocabularyStore};
///
/// let store = VocabularyStore::new()?;
/// let vocabulary = store.load_or_default()?;
/// store.save(&vocabulary)?;
/// # Ok::<(), vocab_store::StoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct VocabularyStore {
    /// Path to the vocabulary file.
    path: PathBuf,
}

impl VocabularyStore {
    /// Creates a store at the default XDG data path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoDataDir` if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let path = Self::default_path()?;
        Ok(Self { path })
    }

    /// Creates a store at a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the default XDG path for the vocabulary file.
    ///
    /// On Unix: `~/.local/share/vocab/vocabulary.json`
    /// On macOS: `~/Library/Application Support/vocab/vocabulary.json`
    /// On Windows: `C:\Users\<User>\AppData\Roaming\vocab\data\vocabulary.json`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoDataDir` if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or(StoreError::NoDataDir)?;
        Ok(project_dirs.data_dir().join(VOCABULARY_FILENAME))
    }

    /// Returns the path to the vocabulary file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the vocabulary from disk.
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::ReadError` if the file cannot be read.
    /// - Returns `StoreError::Json` if the file contains invalid JSON.
    /// - Returns `StoreError::UnsupportedVersion` for files from a newer version.
    pub fn load(&self) -> Result<Vocabulary> {
        let contents = fs::read_to_string(&self.path).map_err(|e| StoreError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;
        self.decode(&contents)
    }

    /// Loads the vocabulary, returning an empty one if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Same as [`load()`](Self::load), except that a missing file is not an error.
    pub fn load_or_default(&self) -> Result<Vocabulary> {
        match self.load() {
            Ok(vocabulary) => Ok(vocabulary),
            Err(StoreError::ReadError { ref source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Ok(Vocabulary::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Saves the vocabulary to disk atomically.
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::CreateDirError` if the directory cannot be created.
    /// - Returns `StoreError::WriteError` if the file cannot be written.
    /// - Returns `StoreError::Json` if serialization fails.
    pub fn save(&self, vocabulary: &Vocabulary) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::CreateDirError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(vocabulary)?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &json).map_err(|e| StoreError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| StoreError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %self.path.display(), words = vocabulary.len(), "saved vocabulary");
        Ok(())
    }

    /// Returns true if the vocabulary file exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Deletes the vocabulary file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DeleteError` if the file cannot be deleted.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::DeleteError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    // =========================================================================
    // Async I/O Methods
    // =========================================================================

    /// Async equivalent of [`load()`](Self::load).
    ///
    /// # Errors
    ///
    /// Same as [`load()`](Self::load).
    pub async fn load_async(&self) -> Result<Vocabulary> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| StoreError::ReadError {
                path: self.path.clone(),
                source: e,
            })?;
        self.decode(&contents)
    }

    /// Async equivalent of [`load_or_default()`](Self::load_or_default).
    ///
    /// # Errors
    ///
    /// Same as [`load_or_default()`](Self::load_or_default).
    pub async fn load_or_default_async(&self) -> Result<Vocabulary> {
        match self.load_async().await {
            Ok(vocabulary) => Ok(vocabulary),
            Err(StoreError::ReadError { ref source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Ok(Vocabulary::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Async equivalent of [`save()`](Self::save).
    ///
    /// # Errors
    ///
    /// Same as [`save()`](Self::save).
    pub async fn save_async(&self, vocabulary: &Vocabulary) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::CreateDirError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let json = serde_json::to_string_pretty(vocabulary)?;

        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| StoreError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::WriteError {
                path: self.path.clone(),
                source: e,
            })?;

        tracing::debug!(path = %self.path.display(), words = vocabulary.len(), "saved vocabulary");
        Ok(())
    }

    fn decode(&self, contents: &str) -> Result<Vocabulary> {
        let vocabulary: Vocabulary = serde_json::from_str(contents)?;
        if vocabulary.version > VOCABULARY_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: vocabulary.version,
                supported: VOCABULARY_VERSION,
            });
        }
        tracing::debug!(path = %self.path.display(), words = vocabulary.len(), "loaded vocabulary");
        Ok(vocabulary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vocab_core::{ContentPiece, Word, WordInfo};

    fn sample() -> Vocabulary {
        let mut vocabulary = Vocabulary::new();
        vocabulary.records.insert(
            "k1".to_string(),
            Word::new(WordInfo::new(
                vec![ContentPiece::Plain("dog".to_string())],
                "animal",
                ["noun"],
            )),
        );
        vocabulary
    }

    // ==========================================================================
    // Synchronous I/O Tests
    // ==========================================================================

    #[test]
    fn test_default_path_returns_xdg_path() {
        let Ok(path) = VocabularyStore::default_path() else {
            // No home directory in this environment.
            return;
        };
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("vocab"), "path should contain 'vocab': {path_str}");
        assert!(path_str.ends_with("vocabulary.json"), "unexpected path: {path_str}");
        assert!(path.is_absolute(), "path should be absolute: {path:?}");
    }

    #[test]
    fn test_store_with_custom_path() {
        let store = VocabularyStore::with_path("/tmp/test/vocabulary.json");
        assert_eq!(store.path(), Path::new("/tmp/test/vocabulary.json"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = VocabularyStore::with_path(dir.path().join("nested").join("vocabulary.json"));

        store.save(&sample()).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), sample());
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_read_error_includes_file_path() {
        let store = VocabularyStore::with_path("/nonexistent/path/to/vocabulary.json");
        let error = store.load().unwrap_err();
        let message = error.to_string();
        assert!(
            message.contains("/nonexistent/path/to/vocabulary.json"),
            "error should include file path: {message}"
        );
        assert!(message.contains("failed to read vocabulary file"));
    }

    #[test]
    fn test_load_or_default_for_missing_file() {
        let store = VocabularyStore::with_path("/nonexistent/path/to/vocabulary.json");
        let vocabulary = store.load_or_default().unwrap();
        assert!(vocabulary.is_empty());
        assert_eq!(vocabulary.version, VOCABULARY_VERSION);
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vocabulary.json");
        fs::write(&path, "{ not json").unwrap();

        let store = VocabularyStore::with_path(path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
        assert!(matches!(store.load_or_default(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_load_rejects_newer_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vocabulary.json");
        fs::write(&path, r#"{"version": 99, "records": {}}"#).unwrap();

        let store = VocabularyStore::with_path(path);
        assert!(matches!(
            store.load(),
            Err(StoreError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_write_error_when_parent_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "blocking").unwrap();

        let store = VocabularyStore::with_path(blocker.join("subdir").join("vocabulary.json"));
        let error = store.save(&sample()).unwrap_err();
        assert!(matches!(error, StoreError::CreateDirError { .. }));
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let store = VocabularyStore::with_path(dir.path().join("vocabulary.json"));
        store.save(&sample()).unwrap();

        store.delete().unwrap();
        assert!(!store.exists());
        // Deleting a missing file is fine.
        store.delete().unwrap();
    }

    // ==========================================================================
    // Async I/O Tests
    // ==========================================================================

    #[tokio::test]
    async fn test_save_and_load_async() {
        let dir = tempdir().unwrap();
        let store = VocabularyStore::with_path(dir.path().join("vocabulary.json"));

        store.save_async(&sample()).await.unwrap();
        assert_eq!(store.load_async().await.unwrap(), sample());
        assert_eq!(store.load().unwrap(), sample());
    }

    #[tokio::test]
    async fn test_load_or_default_async_for_missing_file() {
        let dir = tempdir().unwrap();
        let store = VocabularyStore::with_path(dir.path().join("missing.json"));
        assert!(store.load_or_default_async().await.unwrap().is_empty());
    }
}
