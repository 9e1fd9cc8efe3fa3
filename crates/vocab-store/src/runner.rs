//! Executes query-box text against a record store.

use rand::rngs::ThreadRng;
use rand::Rng;
use thiserror::Error;
use vocab_core::query::{
    parse_query, EvaluateError, Outcome, Query, QueryEvaluator, QueryParseError,
};
use vocab_core::Word;

use crate::records::RecordStore;
use crate::store::StoreError;
use crate::Entry;

/// What a query did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryReport {
    /// Words created by an insert, as stored.
    Inserted(Vec<Entry>),
    /// Words selected by a filter, after the pipeline.
    Listed(Vec<Entry>),
    /// A new session started; the whole collection, in storage order.
    SessionReset(Vec<Entry>),
    /// The full export of the collection.
    Dump(String),
}

/// Errors from running a query.
#[derive(Debug, Error)]
pub enum RunError {
    /// The query text is malformed. Nothing was executed.
    #[error(transparent)]
    Parse(#[from] QueryParseError),

    /// The query could not be evaluated. Nothing was stored.
    #[error(transparent)]
    Evaluate(#[from] EvaluateError),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parses, evaluates and applies queries against a [`RecordStore`].
///
/// # Example
///
/// ```no_run
/// use vocab_store::{QueryReport, QueryRunner, VocabularyStore};
///
/// # async fn run() -> Result<(), vocab_store::RunError> {
/// let mut runner = QueryRunner::new(VocabularyStore::new()?);
/// runner.execute(r#"insert "run(ning)" "to move" #verb"#).await?;
/// if let QueryReport::Listed(entries) = runner.execute("#verb | limit(10)").await? {
///     println!("{} verbs", entries.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct QueryRunner<S, R = ThreadRng> {
    store: S,
    evaluator: QueryEvaluator<R>,
}

impl<S: RecordStore> QueryRunner<S> {
    /// Creates a runner evaluating at the current time.
    pub fn new(store: S) -> Self {
        Self::with_evaluator(store, QueryEvaluator::new())
    }
}

impl<S: RecordStore, R: Rng> QueryRunner<S, R> {
    /// Creates a runner with a specific evaluator (fixed time, seeded RNG).
    pub fn with_evaluator(store: S, evaluator: QueryEvaluator<R>) -> Self {
        Self { store, evaluator }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one query.
    ///
    /// The text is parsed before the store is touched, so a malformed query
    /// never reads or writes the collection.
    ///
    /// # Errors
    ///
    /// Returns `RunError::Parse` for malformed text, `RunError::Evaluate` for
    /// an insert with empty content, and `RunError::Store` if the store
    /// fails.
    pub async fn execute(&mut self, text: &str) -> Result<QueryReport, RunError> {
        let query = parse_query(text)?;

        // Filters read only the words they match; every other query
        // evaluates without a snapshot.
        let snapshot = match &query {
            Query::Filter { expr, .. } => {
                let evaluator = &self.evaluator;
                let predicate = |word: &Word| evaluator.matches(expr, word);
                self.store.list_records(Some(&predicate)).await?
            }
            _ => Vec::new(),
        };

        let report = match self.evaluator.evaluate(&query, snapshot)? {
            Outcome::Inserted(words) => QueryReport::Inserted(self.store.create_records(words).await?),
            Outcome::Listed(entries) => QueryReport::Listed(entries),
            Outcome::SessionReset => {
                self.store.reset_session().await?;
                QueryReport::SessionReset(self.store.list_records(None).await?)
            }
            Outcome::DumpRequested => QueryReport::Dump(self.store.export_all().await?),
        };

        tracing::debug!(report = report_kind(&report), "executed query");
        Ok(report)
    }
}

fn report_kind(report: &QueryReport) -> &'static str {
    match report {
        QueryReport::Inserted(_) => "inserted",
        QueryReport::Listed(_) => "listed",
        QueryReport::SessionReset(_) => "session",
        QueryReport::Dump(_) => "dump",
    }
}
