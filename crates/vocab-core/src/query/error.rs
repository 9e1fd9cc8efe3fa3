//! Error types for query parsing and evaluation.

use thiserror::Error;

use crate::combinator::Failure;
use crate::lexer::{Position, TokenizeError};
use crate::markup::MarkupError;

/// Keywords of the query language, used for "did you mean" suggestions.
pub(crate) const KEYWORDS: &[&str] = &[
    "insert",
    "session",
    "dump",
    "export",
    "all",
    "reviewed",
    "and",
    "or",
    "not",
    "tag",
    "word",
    "content",
    "desc",
    "description",
    "text",
    "reviews",
    "days",
    "limit",
    "skip",
    "sort",
    "shuffle",
    "reverse",
    "last",
    "asc",
];

/// A specialized Result type for query parsing.
pub type QueryResult<T> = Result<T, QueryParseError>;

/// A specialized Result type for query evaluation.
pub type EvaluateResult<T> = Result<T, EvaluateError>;

/// Errors that can occur while parsing a query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryParseError {
    /// The query contains text no token rule matches, such as an
    /// unterminated string.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    /// The tokens do not form a valid query.
    #[error("{}", format_syntax(position, expected, found.as_deref(), suggestion.as_deref()))]
    Syntax {
        /// Where the furthest failed alternative stopped.
        position: Position,
        /// What would have been accepted there.
        expected: Vec<String>,
        /// The token found there, `None` at the end of input.
        found: Option<String>,
        /// A keyword close to the token found, if any.
        suggestion: Option<String>,
    },

    /// Parentheses and negations nest deeper than the parser allows.
    #[error("query nests more than {limit} levels deep at {position}")]
    TooDeep {
        /// The token that went past the limit.
        position: Position,
        /// The deepest nesting accepted.
        limit: usize,
    },

    /// The query chains more boolean operators than the parser allows.
    #[error("query combines more than {limit} conditions at {position}")]
    TooLong {
        /// The operator that went past the limit.
        position: Position,
        /// The most `and` / `or` operators accepted.
        limit: usize,
    },

    /// The content of an insert definition is not valid markup.
    #[error("invalid word content at {position}: {source}")]
    Markup {
        /// Position of the string literal holding the content.
        position: Position,
        /// The markup error, positioned within the content.
        #[source]
        source: MarkupError,
    },
}

impl QueryParseError {
    /// Creates a syntax error, computing a keyword suggestion for `found`.
    pub fn syntax(position: Position, expected: Vec<String>, found: Option<String>) -> Self {
        let suggestion = found.as_deref().and_then(suggest_keyword);
        QueryParseError::Syntax {
            position,
            expected,
            found,
            suggestion,
        }
    }

    /// Creates a markup error for the string literal at `position`.
    pub fn markup(position: Position, source: MarkupError) -> Self {
        QueryParseError::Markup { position, source }
    }

    /// Position in the query text where the error was detected.
    pub fn position(&self) -> Position {
        match self {
            QueryParseError::Tokenize(err) => err.position,
            QueryParseError::Syntax { position, .. } => *position,
            QueryParseError::TooDeep { position, .. } => *position,
            QueryParseError::TooLong { position, .. } => *position,
            QueryParseError::Markup { position, .. } => *position,
        }
    }
}

impl From<Failure> for QueryParseError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Tokenize(err) => QueryParseError::Tokenize(err),
            Failure::Expected(expectation) => QueryParseError::syntax(
                expectation.position,
                expectation.expected,
                expectation.found,
            ),
        }
    }
}

/// Errors that can occur while evaluating a query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvaluateError {
    /// An insert definition has no content.
    #[error("definition {} has no content", index + 1)]
    EmptyContent {
        /// Zero-based index of the definition.
        index: usize,
    },
}

/// Returns the closest keyword to `word`: within edit distance 2, or 1 for
/// words shorter than five characters.
fn suggest_keyword(word: &str) -> Option<String> {
    let lower = word.to_lowercase();
    if KEYWORDS.contains(&lower.as_str()) {
        return None;
    }
    let max_distance = if lower.chars().count() < 5 { 1 } else { 2 };
    KEYWORDS
        .iter()
        .map(|keyword| (strsim::damerau_levenshtein(&lower, keyword), *keyword))
        .filter(|(distance, _)| *distance <= max_distance)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, keyword)| keyword.to_string())
}

fn format_syntax(
    position: &Position,
    expected: &[String],
    found: Option<&str>,
    suggestion: Option<&str>,
) -> String {
    let mut message = format!(
        "syntax error at {position}: expected {}, found {}",
        expected.join(" or "),
        found.map_or_else(|| "end of input".to_string(), |f| format!("'{f}'")),
    );
    if let Some(suggestion) = suggestion {
        message.push_str(&format!(" (did you mean '{suggestion}'?)"));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_keyword() {
        assert_eq!(suggest_keyword("limt").as_deref(), Some("limit"));
        assert_eq!(suggest_keyword("REVIEWD").as_deref(), Some("reviewed"));
        assert_eq!(suggest_keyword("srot").as_deref(), Some("sort"));
        assert_eq!(suggest_keyword("zzzzzz"), None);
        assert_eq!(suggest_keyword("dog"), None);
        assert_eq!(suggest_keyword("limit"), None);
    }

    #[test]
    fn test_syntax_error_message() {
        let err = QueryParseError::syntax(
            Position::at(0, 1, 1),
            vec!["'limit'".to_string(), "'skip'".to_string()],
            Some("limt".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "syntax error at 1:1: expected 'limit' or 'skip', found 'limt' (did you mean 'limit'?)"
        );
    }

    #[test]
    fn test_syntax_error_at_end() {
        let err = QueryParseError::syntax(Position::at(5, 1, 6), vec!["')'".to_string()], None);
        assert_eq!(
            err.to_string(),
            "syntax error at 1:6: expected ')', found end of input"
        );
        assert_eq!(err.position().index, 5);
    }

    #[test]
    fn test_empty_content_is_one_based() {
        assert_eq!(
            EvaluateError::EmptyContent { index: 1 }.to_string(),
            "definition 2 has no content"
        );
    }
}
