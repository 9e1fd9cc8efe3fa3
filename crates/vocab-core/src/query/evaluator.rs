//! Query evaluation against a word collection.
//!
//! The evaluator is pure: it never touches storage. It is handed a snapshot
//! of the collection and reports an [`Outcome`] that the caller acts on
//! (persisting inserted words, resetting the session, exporting).
//!
//! # Example
//!
//! ```
//! use vocab_core::model::{ContentPiece, Word, WordInfo};
//! use vocab_core::query::{parse_query, Outcome, QueryEvaluator};
//!
//! let words = vec![
//!     Word::new(WordInfo::new(vec![ContentPiece::Plain("run".into())], "", ["verb"])),
//!     Word::new(WordInfo::new(vec![ContentPiece::Plain("dog".into())], "", ["noun"])),
//! ];
//!
//! let query = parse_query("#verb").unwrap();
//! let mut evaluator = QueryEvaluator::new();
//! let Outcome::Listed(found) = evaluator.evaluate(&query, words).unwrap() else {
//!     panic!("expected a listing");
//! };
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].content_text(), "run");
//! ```

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rand::Rng;

use super::ast::{BoolExpr, NumericField, Query, SortKey, SortOrder, TransformStmt};
use super::error::{EvaluateError, EvaluateResult};
use crate::model::{Word, WordInfo};

/// What the caller should do with an evaluated query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Newly synthesized words, in input order, to be persisted.
    Inserted(Vec<Word>),
    /// The words selected by a filter, after the pipeline.
    Listed(Vec<T>),
    /// Reset the session, then list everything.
    SessionReset,
    /// Produce a full export of the collection.
    DumpRequested,
}

/// Evaluates parsed queries.
///
/// Holds the reference time used by `days` comparisons and the random
/// source used by `shuffle`.
#[derive(Debug)]
pub struct QueryEvaluator<R = ThreadRng> {
    now: DateTime<Utc>,
    rng: R,
}

impl QueryEvaluator<ThreadRng> {
    /// Creates an evaluator for the current time with the thread RNG.
    pub fn new() -> Self {
        Self::with_rng(Utc::now(), rand::thread_rng())
    }
}

impl Default for QueryEvaluator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> QueryEvaluator<R> {
    /// Creates an evaluator with a fixed reference time and random source.
    pub fn with_rng(now: DateTime<Utc>, rng: R) -> Self {
        Self { now, rng }
    }

    /// The reference time for `days` comparisons.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Evaluates a query against a snapshot of the collection.
    ///
    /// `collection` must be in storage order; filters keep that order unless
    /// the pipeline changes it. Session and dump queries ignore it.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluateError::EmptyContent`] if an insert definition has no
    /// content. Nothing is produced in that case.
    pub fn evaluate<T: AsRef<Word>>(
        &mut self,
        query: &Query,
        collection: Vec<T>,
    ) -> EvaluateResult<Outcome<T>> {
        let outcome = match query {
            Query::Insert { words } => Outcome::Inserted(self.insert(words)?),
            Query::Filter { expr, stmts } => {
                let total = collection.len();
                let matched = self.filter(expr, collection);
                tracing::debug!(total, matched = matched.len(), "filtered collection");
                Outcome::Listed(self.run_pipeline(stmts, matched))
            }
            Query::NewSession => Outcome::SessionReset,
            Query::Dump => Outcome::DumpRequested,
        };
        Ok(outcome)
    }

    /// Synthesizes never-reviewed words from definitions, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluateError::EmptyContent`] for the first definition
    /// without content pieces.
    pub fn insert(&self, words: &[WordInfo]) -> EvaluateResult<Vec<Word>> {
        if let Some(index) = words.iter().position(|info| info.content.is_empty()) {
            return Err(EvaluateError::EmptyContent { index });
        }
        Ok(words.iter().cloned().map(Word::new).collect())
    }

    /// Returns true if `word` satisfies `expr`.
    pub fn matches(&self, expr: &BoolExpr, word: &Word) -> bool {
        match expr {
            BoolExpr::All => true,
            BoolExpr::Reviewed => word.reviewed,
            BoolExpr::HasTag(tag) => word.has_tag(tag),
            BoolExpr::ContentContains(needle) => contains_ignore_case(&word.content_text(), needle),
            BoolExpr::DescriptionContains(needle) => {
                contains_ignore_case(&word.info.description, needle)
            }
            BoolExpr::TextContains(needle) => {
                contains_ignore_case(&word.content_text(), needle)
                    || contains_ignore_case(&word.info.description, needle)
            }
            BoolExpr::Compare { field, op, value } => op.holds(self.field_value(*field, word), *value),
            BoolExpr::And(left, right) => self.matches(left, word) && self.matches(right, word),
            BoolExpr::Or(left, right) => self.matches(left, word) || self.matches(right, word),
            BoolExpr::Not(inner) => !self.matches(inner, word),
        }
    }

    /// Keeps the items whose word satisfies `expr`, in their original order.
    pub fn filter<T: AsRef<Word>>(&self, expr: &BoolExpr, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .filter(|item| self.matches(expr, item.as_ref()))
            .collect()
    }

    /// Runs the statements in order, each transforming the list produced by
    /// the previous one.
    pub fn run_pipeline<T: AsRef<Word>>(&mut self, stmts: &[TransformStmt], items: Vec<T>) -> Vec<T> {
        stmts
            .iter()
            .fold(items, |items, stmt| self.apply(*stmt, items))
    }

    fn apply<T: AsRef<Word>>(&mut self, stmt: TransformStmt, mut items: Vec<T>) -> Vec<T> {
        match stmt {
            TransformStmt::Limit(n) => items.truncate(n),
            TransformStmt::Skip(n) => {
                items.drain(..n.min(items.len()));
            }
            TransformStmt::SortBy { key, order } => match key {
                SortKey::ReviewCount => sort_items(&mut items, order, |word| word.review_count),
                SortKey::LastReviewed => sort_items(&mut items, order, |word| word.last_reviewed),
                SortKey::Word => sort_items(&mut items, order, |word| word.content_text().to_lowercase()),
                SortKey::Description => {
                    sort_items(&mut items, order, |word| word.info.description.to_lowercase())
                }
            },
            TransformStmt::Shuffle => items.shuffle(&mut self.rng),
            TransformStmt::Reverse => items.reverse(),
        }
        items
    }

    /// `None` stands for an infinitely large value.
    fn field_value(&self, field: NumericField, word: &Word) -> Option<i64> {
        match field {
            NumericField::ReviewCount => Some(i64::from(word.review_count)),
            NumericField::DaysSinceReview => word.days_since_review(self.now),
        }
    }
}

/// Evaluates `query` with a fresh [`QueryEvaluator`].
///
/// # Errors
///
/// See [`QueryEvaluator::evaluate`].
pub fn evaluate<T: AsRef<Word>>(query: &Query, collection: Vec<T>) -> EvaluateResult<Outcome<T>> {
    QueryEvaluator::new().evaluate(query, collection)
}

/// Stable sort on a derived key. `None` keys sort first when ascending.
fn sort_items<T, K, F>(items: &mut [T], order: SortOrder, key: F)
where
    T: AsRef<Word>,
    K: Ord,
    F: Fn(&Word) -> K,
{
    match order {
        SortOrder::Ascending => items.sort_by_cached_key(|item| key(item.as_ref())),
        SortOrder::Descending => items.sort_by_cached_key(|item| Reverse(key(item.as_ref()))),
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
