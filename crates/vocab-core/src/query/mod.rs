//! Query language parser and evaluator.
//!
//! One line typed into the query box is one of four commands.
//!
//! # Supported Syntax
//!
//! ## Insert
//! - `insert "run(ning)" "to move" #verb; "dog"` - Add words. Each definition
//!   is a content string (markup, see [`crate::markup`]), an optional
//!   description string and any number of `#tags`. `+` is short for `insert`.
//!
//! ## Session and export
//! - `session` - Start a new review session
//! - `dump` / `export` - Export the collection
//!
//! ## Filter
//! Anything else is a filter: a boolean expression followed by an optional
//! pipeline. An empty query lists every word.
//!
//! - `*` / `all` - Every word
//! - `reviewed` - Reviewed in the current session
//! - `#verb`, `tag:verb` - Has the tag (case-sensitive)
//! - `word:run`, `desc:"to move"`, `text:run` - Case-insensitive substring of
//!   the content, the description, or either
//! - `reviews >= 3`, `days > 7` - Review count, days since the last review
//!
//! ## Boolean Operators
//! - `and` / `&` - AND
//! - `or` - OR
//! - `not` / `!` - NOT
//! - `()` - Grouping
//!
//! ## Pipeline
//! - `| limit(n)`, `| skip(n)`
//! - `| sort(reviews|last|word|description[, asc|desc])`
//! - `| shuffle`, `| reverse`
//!
//! # Example
//!
//! ```
//! use vocab_core::query::{parse_query, BoolExpr, Query, TransformStmt};
//!
//! let query = parse_query("not reviewed | shuffle | limit(20)").unwrap();
//! assert_eq!(
//!     query,
//!     Query::Filter {
//!         expr: BoolExpr::negate(BoolExpr::Reviewed),
//!         stmts: vec![TransformStmt::Shuffle, TransformStmt::Limit(20)],
//!     }
//! );
//! ```

mod ast;
mod error;
mod evaluator;
mod lexer;
mod parser;

pub use ast::{BoolExpr, CompareOp, NumericField, Query, SortKey, SortOrder, TransformStmt};
pub use error::{EvaluateError, EvaluateResult, QueryParseError, QueryResult};
pub use evaluator::{evaluate, Outcome, QueryEvaluator};
pub use lexer::QueryToken;
pub use parser::{parse_query, QueryParser, MAX_NESTING, MAX_OPERATORS};
