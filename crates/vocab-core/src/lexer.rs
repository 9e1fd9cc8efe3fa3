//! Rule-table tokenizer with a lazily materialized token stream.
//!
//! A [`Lexer`] is an ordered list of `(keep, pattern, kind)` rules. At every
//! position the rules are tried top to bottom and the first one that matches
//! wins; there is no longest-match resolution. Tokens produced by rules with
//! `keep = false` (whitespace, comments) never show up in the stream, but
//! their text still advances the position of the next kept token.
//!
//! The stream is a singly linked list that is built on demand: the successor
//! of a [`Token`] is computed the first time [`Token::next`] is called and is
//! memoized afterwards, so walking the stream twice returns the same `Rc`
//! instances without rescanning the input.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use regex::Regex;
use thiserror::Error;

/// Location of a token in the source text.
///
/// Rows and columns are 1-based; `index` is a 0-based byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Byte offset where the token starts.
    pub index: usize,
    /// Row of the first character.
    pub row_begin: usize,
    /// Column of the first character.
    pub column_begin: usize,
    /// Row right after the last character.
    pub row_end: usize,
    /// Column right after the last character.
    pub column_end: usize,
}

impl Position {
    /// Position of the very first character of an input.
    pub fn start() -> Self {
        Self::at(0, 1, 1)
    }

    /// A zero-width position.
    pub fn at(index: usize, row: usize, column: usize) -> Self {
        Self {
            index,
            row_begin: row,
            column_begin: column,
            row_end: row,
            column_end: column,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row_begin, self.column_begin)
    }
}

/// A rule table that cannot be used for tokenizing.
///
/// These are programmer errors: they are reported when the [`Lexer`] is
/// built, never while parsing.
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    /// The pattern is not a valid regular expression.
    #[error("invalid tokenizer pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The pattern can match somewhere other than the scan position.
    #[error("tokenizer patterns should start every alternative with \"^\" and not use multi-line mode: {pattern}")]
    Unanchored {
        /// The offending pattern.
        pattern: String,
    },

    /// The pattern matches the empty string and would never advance.
    #[error("tokenizer patterns must not match empty input: {pattern}")]
    EmptyMatch {
        /// The offending pattern.
        pattern: String,
    },
}

/// No rule matched the remaining input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unable to tokenize the rest of the input at {position}: {remainder}")]
pub struct TokenizeError {
    /// Where tokenizing stopped.
    pub position: Position,
    /// The unconsumed input, starting at `position`.
    pub remainder: String,
}

#[derive(Debug)]
struct Rule<K> {
    keep: bool,
    pattern: Regex,
    kind: K,
}

/// Checks that every top-level alternative of `pattern` starts with `^` or
/// `\A`, and that multi-line mode (which lets `^` match after a newline) is
/// never switched on.
fn is_anchored(pattern: &str) -> bool {
    let mut alternatives = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut in_class = false;
    let mut escaped = false;

    for (i, c) in pattern.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => {
                if enables_multi_line(&pattern[i + 1..]) {
                    return false;
                }
                depth += 1;
            }
            ')' if !in_class => depth = depth.saturating_sub(1),
            '|' if !in_class && depth == 0 => {
                alternatives.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    alternatives.push(&pattern[start..]);

    alternatives
        .iter()
        .all(|alt| alt.starts_with('^') || alt.starts_with("\\A"))
}

/// Whether the group opening right before `rest` sets the `m` flag, as in
/// `(?m)` or `(?im:...)`.
fn enables_multi_line(rest: &str) -> bool {
    let Some(flags) = rest.strip_prefix('?') else {
        return false;
    };
    flags
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .any(|c| c == 'm')
}

impl<K> Rule<K> {
    fn new(keep: bool, pattern: &str, kind: K) -> Result<Self, RuleError> {
        if !is_anchored(pattern) {
            return Err(RuleError::Unanchored {
                pattern: pattern.to_string(),
            });
        }

        let regex = Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        if regex.is_match("") {
            return Err(RuleError::EmptyMatch {
                pattern: pattern.to_string(),
            });
        }

        Ok(Self {
            keep,
            pattern: regex,
            kind,
        })
    }
}

/// An ordered table of tokenizing rules.
///
/// A lexer holds no per-input state and is `Sync` whenever `K` is, so one
/// instance can be shared by any number of concurrent parses.
#[derive(Debug)]
pub struct Lexer<K> {
    rules: Vec<Rule<K>>,
}

impl<K: Copy> Lexer<K> {
    /// Builds a lexer from `(keep, pattern, kind)` rules, in priority order.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] if any pattern fails to compile, is not
    /// anchored at the scan position, or can match the empty string.
    pub fn new<'p, I>(rules: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (bool, &'p str, K)>,
    {
        let rules = rules
            .into_iter()
            .map(|(keep, pattern, kind)| Rule::new(keep, pattern, kind))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Returns the first kept token of `input`, or the end of input.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenizeError`] if no rule matches before the first kept
    /// token is found.
    pub fn parse<'a>(&'a self, input: &'a str) -> Result<Cursor<'a, K>, TokenizeError> {
        self.parse_next_available(input, 0, 1, 1)
    }

    /// Walks the whole kept token stream eagerly.
    pub fn tokenize<'a>(&'a self, input: &'a str) -> Result<Vec<Rc<Token<'a, K>>>, TokenizeError> {
        let mut tokens = Vec::new();
        let mut cursor = self.parse(input)?;
        while let Cursor::Token(token) = cursor {
            cursor = token.next()?;
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Matches a single token (kept or not) at `index`.
    fn parse_next<'a>(
        &'a self,
        input: &'a str,
        index: usize,
        row: usize,
        column: usize,
    ) -> Result<Option<Token<'a, K>>, TokenizeError> {
        if index >= input.len() {
            return Ok(None);
        }

        let rest = &input[index..];
        for rule in &self.rules {
            let Some(found) = rule.pattern.find(rest) else {
                continue;
            };
            // Zero-width matches can't advance the scan.
            if found.start() != 0 || found.end() == 0 {
                continue;
            }

            let text = &rest[..found.end()];
            let (row_end, column_end) = advance(row, column, text);
            return Ok(Some(Token {
                lexer: self,
                input,
                kind: rule.kind,
                text,
                keep: rule.keep,
                position: Position {
                    index,
                    row_begin: row,
                    column_begin: column,
                    row_end,
                    column_end,
                },
                next: OnceCell::new(),
            }));
        }

        Err(TokenizeError {
            position: Position::at(index, row, column),
            remainder: rest.to_string(),
        })
    }

    /// Matches tokens from `index` until a kept one is found.
    fn parse_next_available<'a>(
        &'a self,
        input: &'a str,
        mut index: usize,
        mut row: usize,
        mut column: usize,
    ) -> Result<Cursor<'a, K>, TokenizeError> {
        loop {
            match self.parse_next(input, index, row, column)? {
                None => return Ok(Cursor::End(Position::at(index, row, column))),
                Some(token) if token.keep => return Ok(Cursor::Token(Rc::new(token))),
                Some(token) => {
                    tracing::trace!(skipped = token.text, at = %token.position, "skipped token");
                    index = token.end_index();
                    row = token.position.row_end;
                    column = token.position.column_end;
                }
            }
        }
    }
}

/// Computes the row and column right after `text`.
fn advance(mut row: usize, mut column: usize, text: &str) -> (usize, usize) {
    for c in text.chars() {
        match c {
            '\r' => {}
            '\n' => {
                row += 1;
                column = 1;
            }
            _ => column += 1,
        }
    }
    (row, column)
}

/// A kept token, linked lazily to its successor.
pub struct Token<'a, K> {
    lexer: &'a Lexer<K>,
    input: &'a str,
    /// The rule kind that produced the token.
    pub kind: K,
    /// The matched source text.
    pub text: &'a str,
    /// Where the token sits in the input.
    pub position: Position,
    /// Whether the producing rule keeps its tokens.
    pub keep: bool,
    next: OnceCell<Result<Cursor<'a, K>, TokenizeError>>,
}

impl<'a, K: Copy> Token<'a, K> {
    /// Returns the next kept token after this one, tokenizing on first use.
    ///
    /// The result is memoized: later calls return the same `Rc` (or the same
    /// error) without rescanning.
    pub fn next(&self) -> Result<Cursor<'a, K>, TokenizeError> {
        self.next
            .get_or_init(|| {
                self.lexer.parse_next_available(
                    self.input,
                    self.end_index(),
                    self.position.row_end,
                    self.position.column_end,
                )
            })
            .clone()
    }
}

impl<K> Token<'_, K> {
    /// Byte offset right after the token.
    pub fn end_index(&self) -> usize {
        self.position.index + self.text.len()
    }
}

// Successor links form a singly linked list; unlink it iteratively so long
// inputs don't recurse once per token on drop.
impl<K> Drop for Token<'_, K> {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(Ok(Cursor::Token(token))) = next {
            next = match Rc::try_unwrap(token) {
                Ok(mut token) => token.next.take(),
                Err(_) => None,
            };
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Token<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind)
            .field("text", &self.text)
            .field("position", &self.position)
            .field("keep", &self.keep)
            .finish()
    }
}

/// A point in the token stream: either a kept token or the end of input.
#[derive(Debug)]
pub enum Cursor<'a, K> {
    /// The next kept token.
    Token(Rc<Token<'a, K>>),
    /// No kept tokens remain; the position is right after the input.
    End(Position),
}

impl<K> Clone for Cursor<'_, K> {
    fn clone(&self) -> Self {
        match self {
            Cursor::Token(token) => Cursor::Token(Rc::clone(token)),
            Cursor::End(position) => Cursor::End(*position),
        }
    }
}

impl<'a, K> Cursor<'a, K> {
    /// The token at the cursor, if any.
    pub fn token(&self) -> Option<&Rc<Token<'a, K>>> {
        match self {
            Cursor::Token(token) => Some(token),
            Cursor::End(_) => None,
        }
    }

    /// Where the cursor points.
    pub fn position(&self) -> Position {
        match self {
            Cursor::Token(token) => token.position,
            Cursor::End(position) => *position,
        }
    }

    /// Byte offset of the cursor.
    pub fn index(&self) -> usize {
        self.position().index
    }

    /// Returns true at the end of input.
    pub fn is_end(&self) -> bool {
        matches!(self, Cursor::End(_))
    }
}
