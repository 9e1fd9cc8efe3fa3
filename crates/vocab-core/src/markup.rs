//! Word-content markup.
//!
//! Content is plain text in which parenthesized runs mark optional parts:
//! `run(ning)` is the plain piece `run` followed by the optional piece
//! `ning`. Parentheses do not nest, and there is no escaping.

use std::fmt;
use std::sync::LazyLock;

use thiserror::Error;

use crate::combinator::{alt, map, opt, parse_all, repeat, seq, tok, Failure, PResult};
use crate::lexer::{Cursor, Lexer, Position, TokenizeError};
use crate::model::ContentPiece;

/// Token kinds of the markup language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkupToken {
    OpenParen,
    CloseParen,
    Text,
}

impl fmt::Display for MarkupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkupToken::OpenParen => f.write_str("'('"),
            MarkupToken::CloseParen => f.write_str("')'"),
            MarkupToken::Text => f.write_str("text"),
        }
    }
}

static MARKUP_LEXER: LazyLock<Lexer<MarkupToken>> = LazyLock::new(|| {
    Lexer::new([
        (true, r"^\(", MarkupToken::OpenParen),
        (true, r"^\)", MarkupToken::CloseParen),
        (true, r"^[^()]+", MarkupToken::Text),
    ])
    .expect("markup rule table is valid")
});

/// A specialized Result type for markup parsing.
pub type MarkupResult<T> = Result<T, MarkupError>;

/// Errors produced by [`parse_markup`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarkupError {
    /// A character no rule covers. The rule table covers every character,
    /// so this only surfaces if the table is changed.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    /// Parentheses do not pair up: an unclosed `(`, a stray `)` or a nested
    /// `(`.
    #[error("unbalanced parentheses at {position}: expected {}, found {}", expected.join(" or "), found.as_deref().unwrap_or("end of input"))]
    Unbalanced {
        /// Where the problem was detected.
        position: Position,
        /// The offending token text, `None` at the end of input.
        found: Option<String>,
        /// What would have been accepted.
        expected: Vec<String>,
    },
}

impl MarkupError {
    /// Position of the error within the content text.
    pub fn position(&self) -> Position {
        match self {
            MarkupError::Tokenize(err) => err.position,
            MarkupError::Unbalanced { position, .. } => *position,
        }
    }
}

impl From<Failure> for MarkupError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Tokenize(err) => MarkupError::Tokenize(err),
            Failure::Expected(expectation) => MarkupError::Unbalanced {
                position: expectation.position,
                found: expectation.found,
                expected: expectation.expected,
            },
        }
    }
}

// pieces   ::= (optional | plain)* END
// optional ::= "(" TEXT? ")"
// plain    ::= TEXT

fn optional(input: Cursor<'_, MarkupToken>) -> PResult<'_, MarkupToken, ContentPiece> {
    map(
        seq((
            tok(MarkupToken::OpenParen),
            opt(tok(MarkupToken::Text)),
            tok(MarkupToken::CloseParen),
        )),
        |(_, text, _)| {
            ContentPiece::Optional(text.map(|t| t.text.to_string()).unwrap_or_default())
        },
    )(input)
}

fn plain(input: Cursor<'_, MarkupToken>) -> PResult<'_, MarkupToken, ContentPiece> {
    map(tok(MarkupToken::Text), |t| ContentPiece::Plain(t.text.to_string()))(input)
}

/// Parses content markup into pieces.
///
/// Whitespace is preserved verbatim. An empty string yields no pieces.
///
/// # Example
///
/// ```
/// use vocab_core::markup::parse_markup;
/// use vocab_core::model::ContentPiece;
///
/// let pieces = parse_markup("run(ning)").unwrap();
/// assert_eq!(
///     pieces,
///     vec![
///         ContentPiece::Plain("run".to_string()),
///         ContentPiece::Optional("ning".to_string()),
///     ]
/// );
/// ```
///
/// # Errors
///
/// Returns [`MarkupError::Unbalanced`] when parentheses do not pair up.
pub fn parse_markup(text: &str) -> MarkupResult<Vec<ContentPiece>> {
    let cursor = MARKUP_LEXER.parse(text)?;
    let pieces = parse_all(repeat(alt((optional, plain)), 0, None), cursor)?;
    Ok(pieces)
}

/// Serializes pieces back into markup.
pub fn render_markup(pieces: &[ContentPiece]) -> String {
    let mut out = String::new();
    for piece in pieces {
        match piece {
            ContentPiece::Plain(text) => out.push_str(text),
            ContentPiece::Optional(text) => {
                out.push('(');
                out.push_str(text);
                out.push(')');
            }
        }
    }
    out
}

/// Inserts an empty `()` pair at byte offset `cursor` of an edit buffer and
/// returns the cursor placed between the two parentheses.
///
/// Returns `None` and leaves the buffer untouched if `cursor` is past the end
/// or not on a character boundary.
pub fn insert_optional_delimiters(buffer: &mut String, cursor: usize) -> Option<usize> {
    if !buffer.is_char_boundary(cursor) {
        return None;
    }
    buffer.insert_str(cursor, "()");
    Some(cursor + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> ContentPiece {
        ContentPiece::Plain(text.to_string())
    }

    fn optional(text: &str) -> ContentPiece {
        ContentPiece::Optional(text.to_string())
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_markup("").unwrap(), vec![]);
    }

    #[test]
    fn test_plain_only() {
        assert_eq!(parse_markup("dog").unwrap(), vec![plain("dog")]);
    }

    #[test]
    fn test_optional_suffix() {
        assert_eq!(
            parse_markup("run(ning)").unwrap(),
            vec![plain("run"), optional("ning")]
        );
    }

    #[test]
    fn test_optional_in_the_middle() {
        assert_eq!(
            parse_markup("run(ning) tail").unwrap(),
            vec![plain("run"), optional("ning"), plain(" tail")]
        );
    }

    #[test]
    fn test_leading_optional_and_whitespace_preserved() {
        assert_eq!(
            parse_markup("(to) go  home").unwrap(),
            vec![optional("to"), plain(" go  home")]
        );
    }

    #[test]
    fn test_empty_parens() {
        assert_eq!(parse_markup("()").unwrap(), vec![optional("")]);
        assert_eq!(
            parse_markup("a()b").unwrap(),
            vec![plain("a"), optional(""), plain("b")]
        );
    }

    #[test]
    fn test_adjacent_optionals() {
        assert_eq!(
            parse_markup("(a)(b)").unwrap(),
            vec![optional("a"), optional("b")]
        );
    }

    #[test]
    fn test_unclosed_paren() {
        let err = parse_markup("a(b").unwrap_err();
        match err {
            MarkupError::Unbalanced {
                position, found, ..
            } => {
                assert_eq!(position.index, 3);
                assert_eq!(found, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_stray_close_paren() {
        let err = parse_markup("a)b").unwrap_err();
        assert!(matches!(err, MarkupError::Unbalanced { .. }));
        assert_eq!(err.position().index, 1);
    }

    #[test]
    fn test_nested_parens_rejected() {
        let err = parse_markup("a(b(c))").unwrap_err();
        assert!(matches!(err, MarkupError::Unbalanced { .. }));
        assert_eq!(err.position().index, 3);
    }

    #[test]
    fn test_error_message() {
        let err = parse_markup("a(b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unbalanced parentheses at 1:4: expected ')', found end of input"
        );
    }

    #[test]
    fn test_render_round_trip() {
        for text in ["", "dog", "run(ning)", "(to) go", "a()b", "(a)(b) c"] {
            let pieces = parse_markup(text).unwrap();
            assert_eq!(render_markup(&pieces), text);
            assert_eq!(parse_markup(&render_markup(&pieces)).unwrap(), pieces);
        }
    }

    #[test]
    fn test_insert_optional_delimiters() {
        let mut buffer = "running".to_string();
        assert_eq!(insert_optional_delimiters(&mut buffer, 3), Some(4));
        assert_eq!(buffer, "run()ning");

        let mut buffer = String::new();
        assert_eq!(insert_optional_delimiters(&mut buffer, 0), Some(1));
        assert_eq!(buffer, "()");
    }

    #[test]
    fn test_insert_optional_delimiters_rejects_bad_cursor() {
        let mut buffer = "été".to_string();
        assert_eq!(insert_optional_delimiters(&mut buffer, 1), None);
        assert_eq!(insert_optional_delimiters(&mut buffer, 99), None);
        assert_eq!(buffer, "été");
    }
}
