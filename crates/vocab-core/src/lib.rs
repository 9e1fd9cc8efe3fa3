//! Parsing and query engine for a personal vocabulary collection.
//!
//! The crate is layered bottom-up:
//!
//! - [`lexer`]: an ordered regex rule table producing a lazy, memoized token
//!   stream.
//! - [`combinator`]: parser combinators over that stream.
//! - [`markup`]: word-content markup (`run(ning)`) into [`ContentPiece`]s.
//! - [`query`]: the query language, compiled to a closed AST and evaluated
//!   against a snapshot of the collection.
//!
//! Nothing here performs I/O. Storage is the caller's concern.

pub mod combinator;
pub mod lexer;
pub mod markup;
pub mod model;
pub mod query;

pub use lexer::{Cursor, Lexer, Position, RuleError, Token, TokenizeError};
pub use markup::{parse_markup, render_markup, MarkupError};
pub use model::{is_valid_tag, ContentPiece, Word, WordInfo};
pub use query::{evaluate, parse_query, Outcome, Query, QueryEvaluator, QueryParseError};
