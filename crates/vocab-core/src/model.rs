//! Vocabulary data model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Characters that may not appear in a tag name.
const TAG_FORBIDDEN: &[char] = &['#', ';', '|', ',', '(', ')', '"', ':'];

/// A fragment of a word's content.
///
/// `Optional` pieces are the parenthesized parts of the markup, such as the
/// `ning` in `run(ning)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "lowercase")]
pub enum ContentPiece {
    /// Text that is always part of the word.
    Plain(String),
    /// Text that may be omitted.
    Optional(String),
}

impl ContentPiece {
    /// Returns the text of the piece without delimiters.
    pub fn text(&self) -> &str {
        match self {
            ContentPiece::Plain(text) | ContentPiece::Optional(text) => text,
        }
    }

    /// Returns true for an optional piece.
    pub fn is_optional(&self) -> bool {
        matches!(self, ContentPiece::Optional(_))
    }
}

/// The user-authored part of a word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordInfo {
    /// Parsed content markup.
    pub content: Vec<ContentPiece>,

    /// Free-form description (meaning, translation, example).
    #[serde(default)]
    pub description: String,

    /// Tag names, without the leading `#`.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl WordInfo {
    /// Creates word info from its parts.
    pub fn new(
        content: Vec<ContentPiece>,
        description: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            content,
            description: description.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the content with every piece's text joined, without
    /// parentheses.
    pub fn content_text(&self) -> String {
        self.content.iter().map(ContentPiece::text).collect()
    }
}

/// A word in the collection, with its review state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Content, description and tags.
    #[serde(flatten)]
    pub info: WordInfo,

    /// How many times the word has been reviewed, across all sessions.
    #[serde(default)]
    pub review_count: u32,

    /// When the word was last reviewed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,

    /// Whether the word has been reviewed in the current session.
    #[serde(default)]
    pub reviewed: bool,
}

impl Word {
    /// Creates a never-reviewed word.
    pub fn new(info: WordInfo) -> Self {
        Self {
            info,
            review_count: 0,
            last_reviewed: None,
            reviewed: false,
        }
    }

    /// Records a review at `now`.
    ///
    /// Returns `false` and changes nothing if the word was already reviewed
    /// in this session.
    pub fn review(&mut self, now: DateTime<Utc>) -> bool {
        if self.reviewed {
            return false;
        }
        self.review_count = self.review_count.saturating_add(1);
        self.last_reviewed = Some(now);
        self.reviewed = true;
        true
    }

    /// Clears the per-session reviewed flag. Review history is kept.
    pub fn reset_session(&mut self) {
        self.reviewed = false;
    }

    /// Replaces the user-authored fields, keeping the review state.
    pub fn apply(&mut self, info: WordInfo) {
        self.info = info;
    }

    /// See [`WordInfo::content_text`].
    pub fn content_text(&self) -> String {
        self.info.content_text()
    }

    /// Returns true if the word carries `tag` (case-sensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.info.tags.contains(tag)
    }

    /// Whole days elapsed between the last review and `now`, or `None` if the
    /// word was never reviewed.
    pub fn days_since_review(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_reviewed
            .map(|last| now.signed_duration_since(last).num_days())
    }
}

impl AsRef<Word> for Word {
    fn as_ref(&self) -> &Word {
        self
    }
}

/// Returns true if `tag` can be used as a tag name.
pub fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && !tag
            .chars()
            .any(|c| c.is_whitespace() || TAG_FORBIDDEN.contains(&c))
}
