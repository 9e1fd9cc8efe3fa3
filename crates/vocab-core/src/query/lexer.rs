//! Lexer for the query language.
//!
//! The rule table is ordered: the first rule that matches wins, so
//! multi-character operators are listed before their prefixes (`!=` before
//! `!`, `<=` before `<`).

use std::fmt;
use std::sync::LazyLock;

use crate::lexer::Lexer;

/// Token kinds produced by the query lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryToken {
    /// Spaces, tabs and newlines. Never reaches the parser.
    Whitespace,
    /// A double-quoted string literal, quotes included.
    Str,
    /// A non-negative integer.
    Number,
    /// One of `!=`, `<=`, `>=`, `==`, `=`, `<`, `>`.
    Compare,
    /// `!`
    Bang,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `:`
    Colon,
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `#name`
    Tag,
    /// A keyword or bare word.
    Ident,
}

impl fmt::Display for QueryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryToken::Whitespace => "whitespace",
            QueryToken::Str => "string",
            QueryToken::Number => "number",
            QueryToken::Compare => "comparison operator",
            QueryToken::Bang => "'!'",
            QueryToken::Amp => "'&'",
            QueryToken::Pipe => "'|'",
            QueryToken::Semicolon => "';'",
            QueryToken::Comma => "','",
            QueryToken::LParen => "'('",
            QueryToken::RParen => "')'",
            QueryToken::Colon => "':'",
            QueryToken::Star => "'*'",
            QueryToken::Plus => "'+'",
            QueryToken::Tag => "tag",
            QueryToken::Ident => "identifier",
        };
        f.write_str(name)
    }
}

pub(crate) static QUERY_LEXER: LazyLock<Lexer<QueryToken>> = LazyLock::new(|| {
    Lexer::new([
        (false, r"^\s+", QueryToken::Whitespace),
        (true, r#"^"(?:[^"\\]|\\.)*""#, QueryToken::Str),
        (true, r"^[0-9]+", QueryToken::Number),
        (true, r"^(?:!=|<=|>=|==|=|<|>)", QueryToken::Compare),
        (true, r"^!", QueryToken::Bang),
        (true, r"^&", QueryToken::Amp),
        (true, r"^\|", QueryToken::Pipe),
        (true, r"^;", QueryToken::Semicolon),
        (true, r"^,", QueryToken::Comma),
        (true, r"^\(", QueryToken::LParen),
        (true, r"^\)", QueryToken::RParen),
        (true, r"^:", QueryToken::Colon),
        (true, r"^\*", QueryToken::Star),
        (true, r"^\+", QueryToken::Plus),
        (true, r#"^#[^\s#;|,():"]+"#, QueryToken::Tag),
        (true, r"^[\p{L}_][\p{L}\p{N}_\-]*", QueryToken::Ident),
    ])
    .expect("query rule table is valid")
});

/// Strips the quotes of a string literal and resolves `\"` and `\\`.
///
/// Any other escaped character stands for itself.
pub(crate) fn unescape(literal: &str) -> String {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<QueryToken> {
        QUERY_LEXER
            .tokenize(input)
            .unwrap()
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    fn texts(input: &str) -> Vec<String> {
        QUERY_LEXER
            .tokenize(input)
            .unwrap()
            .iter()
            .map(|t| t.text.to_string())
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(kinds("").is_empty());
        assert!(kinds("   \n\t").is_empty());
    }

    #[test]
    fn test_keywords_are_identifiers() {
        assert_eq!(
            kinds("not reviewed and all"),
            vec![
                QueryToken::Ident,
                QueryToken::Ident,
                QueryToken::Ident,
                QueryToken::Ident
            ]
        );
    }

    #[test]
    fn test_tag() {
        assert_eq!(kinds("#verb"), vec![QueryToken::Tag]);
        assert_eq!(texts("#verb,#noun"), vec!["#verb", ",", "#noun"]);
    }

    #[test]
    fn test_lone_hash_is_not_a_tag() {
        assert!(QUERY_LEXER.tokenize("#").is_err());
    }

    #[test]
    fn test_string_with_escapes() {
        assert_eq!(kinds(r#""say \"hi\"""#), vec![QueryToken::Str]);
        assert_eq!(texts(r#""a\\" "b""#), vec![r#""a\\""#, r#""b""#]);
    }

    #[test]
    fn test_unterminated_string_fails() {
        let err = QUERY_LEXER.tokenize(r#"insert "run"#).unwrap_err();
        assert_eq!(err.position.index, 7);
        assert_eq!(err.remainder, "\"run");
    }

    #[test]
    fn test_not_equal_is_one_token() {
        assert_eq!(
            kinds("reviews != 3"),
            vec![QueryToken::Ident, QueryToken::Compare, QueryToken::Number]
        );
        assert_eq!(texts("reviews!=3"), vec!["reviews", "!=", "3"]);
    }

    #[test]
    fn test_bang_alone() {
        assert_eq!(kinds("!reviewed"), vec![QueryToken::Bang, QueryToken::Ident]);
    }

    #[test]
    fn test_comparison_operators() {
        assert_eq!(
            texts("< <= > >= = =="),
            vec!["<", "<=", ">", ">=", "=", "=="]
        );
        assert!(kinds("<= >=").iter().all(|k| *k == QueryToken::Compare));
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("&|;,():*+"),
            vec![
                QueryToken::Amp,
                QueryToken::Pipe,
                QueryToken::Semicolon,
                QueryToken::Comma,
                QueryToken::LParen,
                QueryToken::RParen,
                QueryToken::Colon,
                QueryToken::Star,
                QueryToken::Plus,
            ]
        );
    }

    #[test]
    fn test_pipeline() {
        assert_eq!(
            texts("* | sort(reviews, desc) | limit(10)"),
            vec!["*", "|", "sort", "(", "reviews", ",", "desc", ")", "|", "limit", "(", "10", ")"]
        );
    }

    #[test]
    fn test_unicode_identifier() {
        assert_eq!(texts("word:naïve"), vec!["word", ":", "naïve"]);
    }

    #[test]
    fn test_unknown_character_fails() {
        let err = QUERY_LEXER.tokenize("reviewed $").unwrap_err();
        assert_eq!(err.position.index, 9);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#""plain""#), "plain");
        assert_eq!(unescape(r#""say \"hi\"""#), r#"say "hi""#);
        assert_eq!(unescape(r#""back\\slash""#), r"back\slash");
        assert_eq!(unescape(r#""\n""#), "n");
        assert_eq!(unescape(r#""""#), "");
    }
}
