//! Parser combinators over the lazy token stream.
//!
//! A parser is anything implementing [`Parser`]; every
//! `Fn(Cursor) -> PResult` qualifies, including plain `fn` items, which is
//! how recursive grammars are written. Parsers never mutate shared state:
//! the input is a [`Cursor`] passed by value, so backtracking is simply
//! retrying with the cursor you started from.
//!
//! # Ambiguity
//!
//! [`alt`] returns the first branch that succeeds, in the order given. There
//! is no longest-match disambiguation, so grammars must list more specific
//! branches before more general ones.
//!
//! # Error reporting
//!
//! Every result carries the furthest [`Expectation`] any abandoned branch
//! reached. When parsing ultimately fails, the reported error is the one that
//! got furthest into the input, with the expected sets of equally far
//! failures merged.

use std::fmt;
use std::rc::Rc;

use crate::lexer::{Cursor, Position, Token, TokenizeError};

/// What a parser wanted to see at a given position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    /// Where the mismatch happened.
    pub position: Position,
    /// Text of the token found there, `None` at the end of input.
    pub found: Option<String>,
    /// Human-readable descriptions of acceptable input.
    pub expected: Vec<String>,
}

impl Expectation {
    /// Creates an expectation at the cursor.
    pub fn at<K>(cursor: &Cursor<'_, K>, expected: impl Into<String>) -> Self {
        Self {
            position: cursor.position(),
            found: cursor.token().map(|token| token.text.to_string()),
            expected: vec![expected.into()],
        }
    }

    /// Keeps whichever expectation got further into the input.
    pub fn furthest(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (None, other) | (other, None) => other,
            (Some(a), Some(b)) => Some(a.merge(b)),
        }
    }

    fn merge(mut self, other: Self) -> Self {
        use std::cmp::Ordering;

        match self.position.index.cmp(&other.position.index) {
            Ordering::Less => other,
            Ordering::Greater => self,
            Ordering::Equal => {
                for expected in other.expected {
                    if !self.expected.contains(&expected) {
                        self.expected.push(expected);
                    }
                }
                self
            }
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {} at {}", self.expected.join(" or "), self.position)?;
        match &self.found {
            Some(found) => write!(f, ", found '{found}'"),
            None => write!(f, ", found end of input"),
        }
    }
}

/// Why a parser did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The input could not be tokenized. Never backtracked over.
    Tokenize(TokenizeError),
    /// The tokens did not fit the grammar.
    Expected(Expectation),
}

impl Failure {
    /// Folds in the furthest expectation seen so far.
    pub fn merge(self, furthest: Option<Expectation>) -> Self {
        match self {
            Failure::Expected(expectation) => match furthest {
                Some(furthest) => Failure::Expected(expectation.merge(furthest)),
                None => Failure::Expected(expectation),
            },
            tokenize => tokenize,
        }
    }
}

impl From<TokenizeError> for Failure {
    fn from(err: TokenizeError) -> Self {
        Failure::Tokenize(err)
    }
}

/// A successful parse.
#[derive(Debug)]
pub struct Parsed<'a, K, T> {
    /// The parsed value.
    pub value: T,
    /// The cursor after the consumed tokens.
    pub rest: Cursor<'a, K>,
    /// The furthest failure abandoned along the way.
    pub furthest: Option<Expectation>,
}

impl<'a, K, T> Parsed<'a, K, T> {
    /// A success with no abandoned failures.
    pub fn new(value: T, rest: Cursor<'a, K>) -> Self {
        Self {
            value,
            rest,
            furthest: None,
        }
    }

    fn map_value<U>(self, f: impl FnOnce(T) -> U) -> Parsed<'a, K, U> {
        Parsed {
            value: f(self.value),
            rest: self.rest,
            furthest: self.furthest,
        }
    }
}

/// Result of running a parser.
pub type PResult<'a, K, T> = Result<Parsed<'a, K, T>, Failure>;

/// A parser producing `T` from a stream of `K` tokens.
pub trait Parser<'a, K, T> {
    /// Runs the parser at `input`.
    fn parse(&self, input: Cursor<'a, K>) -> PResult<'a, K, T>;
}

impl<'a, K: 'a, T, F> Parser<'a, K, T> for F
where
    F: Fn(Cursor<'a, K>) -> PResult<'a, K, T>,
{
    fn parse(&self, input: Cursor<'a, K>) -> PResult<'a, K, T> {
        self(input)
    }
}

/// Consumes one token of the given kind.
pub fn tok<'a, K>(kind: K) -> impl Fn(Cursor<'a, K>) -> PResult<'a, K, Rc<Token<'a, K>>>
where
    K: Copy + PartialEq + fmt::Display + 'a,
{
    move |input: Cursor<'a, K>| match &input {
        Cursor::Token(token) if token.kind == kind => {
            let token = Rc::clone(token);
            let rest = token.next()?;
            Ok(Parsed::new(token, rest))
        }
        _ => Err(Failure::Expected(Expectation::at(&input, kind.to_string()))),
    }
}

/// Consumes one token of the given kind whose text equals `text`, ignoring
/// ASCII case. Used for keywords lexed as identifiers.
pub fn tok_text<'a, K>(
    kind: K,
    text: &'static str,
) -> impl Fn(Cursor<'a, K>) -> PResult<'a, K, Rc<Token<'a, K>>>
where
    K: Copy + PartialEq + 'a,
{
    move |input: Cursor<'a, K>| match &input {
        Cursor::Token(token) if token.kind == kind && token.text.eq_ignore_ascii_case(text) => {
            let token = Rc::clone(token);
            let rest = token.next()?;
            Ok(Parsed::new(token, rest))
        }
        _ => Err(Failure::Expected(Expectation::at(&input, format!("'{text}'")))),
    }
}

/// Succeeds only at the end of input.
pub fn end<'a, K: 'a>() -> impl Fn(Cursor<'a, K>) -> PResult<'a, K, ()> {
    |input: Cursor<'a, K>| match input {
        Cursor::End(_) => Ok(Parsed::new((), input)),
        Cursor::Token(_) => Err(Failure::Expected(Expectation::at(&input, "end of input"))),
    }
}

/// A tuple of parsers run one after the other.
pub trait Sequence<'a, K, T> {
    /// Runs every parser in order.
    fn parse_sequence(&self, input: Cursor<'a, K>) -> PResult<'a, K, T>;
}

macro_rules! impl_sequence {
    ($($P:ident $p:ident $T:ident $v:ident),+) => {
        impl<'a, K, $($T,)+ $($P,)+> Sequence<'a, K, ($($T,)+)> for ($($P,)+)
        where
            $($P: Parser<'a, K, $T>,)+
        {
            fn parse_sequence(&self, input: Cursor<'a, K>) -> PResult<'a, K, ($($T,)+)> {
                let ($($p,)+) = self;
                let rest = input;
                let mut furthest: Option<Expectation> = None;
                $(
                    let parsed = $p.parse(rest).map_err(|failure| failure.merge(furthest.clone()))?;
                    let rest = parsed.rest;
                    furthest = Expectation::furthest(furthest, parsed.furthest);
                    let $v = parsed.value;
                )+
                Ok(Parsed {
                    value: ($($v,)+),
                    rest,
                    furthest,
                })
            }
        }
    };
}

impl_sequence!(P1 p1 T1 v1, P2 p2 T2 v2);
impl_sequence!(P1 p1 T1 v1, P2 p2 T2 v2, P3 p3 T3 v3);
impl_sequence!(P1 p1 T1 v1, P2 p2 T2 v2, P3 p3 T3 v3, P4 p4 T4 v4);
impl_sequence!(P1 p1 T1 v1, P2 p2 T2 v2, P3 p3 T3 v3, P4 p4 T4 v4, P5 p5 T5 v5);

/// Runs a tuple of parsers in order and returns their values as a tuple.
///
/// If any parser fails, the whole sequence fails and consumes nothing.
pub fn seq<'a, K, T, S>(parsers: S) -> impl Fn(Cursor<'a, K>) -> PResult<'a, K, T>
where
    S: Sequence<'a, K, T>,
{
    move |input: Cursor<'a, K>| parsers.parse_sequence(input)
}

/// A tuple of parsers producing the same type, tried in order.
pub trait Alternatives<'a, K, T> {
    /// Returns the first branch that succeeds.
    fn parse_alternatives(&self, input: Cursor<'a, K>) -> PResult<'a, K, T>;
}

macro_rules! impl_alternatives {
    ($($P:ident $p:ident),+) => {
        impl<'a, K, T, $($P,)+> Alternatives<'a, K, T> for ($($P,)+)
        where
            $($P: Parser<'a, K, T>,)+
        {
            fn parse_alternatives(&self, input: Cursor<'a, K>) -> PResult<'a, K, T> {
                let ($($p,)+) = self;
                let mut furthest: Option<Expectation> = None;
                $(
                    match $p.parse(input.clone()) {
                        Ok(mut parsed) => {
                            parsed.furthest = Expectation::furthest(furthest, parsed.furthest);
                            return Ok(parsed);
                        }
                        Err(Failure::Expected(expectation)) => {
                            furthest = Expectation::furthest(furthest, Some(expectation));
                        }
                        Err(failure) => return Err(failure),
                    }
                )+
                Err(Failure::Expected(
                    furthest.unwrap_or_else(|| Expectation::at(&input, "an alternative")),
                ))
            }
        }
    };
}

impl_alternatives!(P1 p1, P2 p2);
impl_alternatives!(P1 p1, P2 p2, P3 p3);
impl_alternatives!(P1 p1, P2 p2, P3 p3, P4 p4);
impl_alternatives!(P1 p1, P2 p2, P3 p3, P4 p4, P5 p5);
impl_alternatives!(P1 p1, P2 p2, P3 p3, P4 p4, P5 p5, P6 p6);

/// Tries a tuple of parsers in order and returns the first success.
pub fn alt<'a, K, T, A>(parsers: A) -> impl Fn(Cursor<'a, K>) -> PResult<'a, K, T>
where
    A: Alternatives<'a, K, T>,
{
    move |input: Cursor<'a, K>| parsers.parse_alternatives(input)
}

/// Applies `parser` greedily, at least `min` and at most `max` times.
///
/// Stops early if an application succeeds without consuming input.
pub fn repeat<'a, K, T, P>(
    parser: P,
    min: usize,
    max: Option<usize>,
) -> impl Fn(Cursor<'a, K>) -> PResult<'a, K, Vec<T>>
where
    P: Parser<'a, K, T>,
{
    move |input: Cursor<'a, K>| {
        let mut values = Vec::new();
        let mut rest = input;
        let mut furthest: Option<Expectation> = None;

        while max.map_or(true, |max| values.len() < max) {
            match parser.parse(rest.clone()) {
                Ok(parsed) => {
                    furthest = Expectation::furthest(furthest, parsed.furthest);
                    let advanced = parsed.rest.index() > rest.index();
                    values.push(parsed.value);
                    rest = parsed.rest;
                    if !advanced {
                        break;
                    }
                }
                Err(Failure::Expected(expectation)) => {
                    if values.len() < min {
                        return Err(Failure::Expected(expectation).merge(furthest));
                    }
                    furthest = Expectation::furthest(furthest, Some(expectation));
                    break;
                }
                Err(failure) => return Err(failure),
            }
        }

        if values.len() < min {
            let expectation = Expectation::at(&rest, format!("at least {min} repetitions"));
            return Err(Failure::Expected(expectation).merge(furthest));
        }

        Ok(Parsed {
            value: values,
            rest,
            furthest,
        })
    }
}

/// Transforms the value of a successful parse.
pub fn map<'a, K, T, U, P, F>(parser: P, f: F) -> impl Fn(Cursor<'a, K>) -> PResult<'a, K, U>
where
    P: Parser<'a, K, T>,
    F: Fn(T) -> U,
{
    move |input: Cursor<'a, K>| parser.parse(input).map(|parsed| parsed.map_value(&f))
}

/// Like [`map`], but `f` may reject the value; the failure is reported at
/// the position where `parser` started.
pub fn try_map<'a, K, T, U, P, F>(
    parser: P,
    expected: &'static str,
    f: F,
) -> impl Fn(Cursor<'a, K>) -> PResult<'a, K, U>
where
    P: Parser<'a, K, T>,
    F: Fn(T) -> Option<U>,
{
    move |input: Cursor<'a, K>| {
        let start = input.clone();
        let parsed = parser.parse(input)?;
        match f(parsed.value) {
            Some(value) => Ok(Parsed {
                value,
                rest: parsed.rest,
                furthest: parsed.furthest,
            }),
            None => Err(Failure::Expected(Expectation::at(&start, expected)).merge(parsed.furthest)),
        }
    }
}

/// Zero or one application of `parser`.
pub fn opt<'a, K: 'a, T, P>(parser: P) -> impl Fn(Cursor<'a, K>) -> PResult<'a, K, Option<T>>
where
    P: Parser<'a, K, T>,
{
    map(repeat(parser, 0, Some(1)), |values: Vec<T>| values.into_iter().next())
}

/// Runs `prefix` then `parser`, keeping only the second value.
pub fn preceded<'a, K: 'a, S, T, P, Q>(prefix: P, parser: Q) -> impl Fn(Cursor<'a, K>) -> PResult<'a, K, T>
where
    P: Parser<'a, K, S>,
    Q: Parser<'a, K, T>,
{
    map(seq((prefix, parser)), |(_, value): (S, T)| value)
}

/// One or more `parser`s separated by `separator`.
///
/// A trailing separator that is not followed by another item is left
/// unconsumed.
pub fn sep_by1<'a, K, S, T, P, Q>(
    parser: P,
    separator: Q,
) -> impl Fn(Cursor<'a, K>) -> PResult<'a, K, Vec<T>>
where
    P: Parser<'a, K, T>,
    Q: Parser<'a, K, S>,
{
    move |input: Cursor<'a, K>| {
        let first = parser.parse(input)?;
        let mut furthest = first.furthest;
        let mut values = vec![first.value];
        let mut rest = first.rest;

        loop {
            let sep = match separator.parse(rest.clone()) {
                Ok(sep) => sep,
                Err(Failure::Expected(expectation)) => {
                    furthest = Expectation::furthest(furthest, Some(expectation));
                    break;
                }
                Err(failure) => return Err(failure),
            };
            match parser.parse(sep.rest) {
                Ok(item) => {
                    furthest = Expectation::furthest(furthest, sep.furthest);
                    furthest = Expectation::furthest(furthest, item.furthest);
                    values.push(item.value);
                    rest = item.rest;
                }
                Err(Failure::Expected(expectation)) => {
                    furthest = Expectation::furthest(furthest, sep.furthest);
                    furthest = Expectation::furthest(furthest, Some(expectation));
                    break;
                }
                Err(failure) => return Err(failure),
            }
        }

        Ok(Parsed {
            value: values,
            rest,
            furthest,
        })
    }
}

/// Runs `parser` and requires that it consumes the whole input.
///
/// # Errors
///
/// Returns the furthest failure encountered, so that a grammar that stops
/// early still reports the real problem rather than "expected end of input"
/// at the stopping point.
pub fn parse_all<'a, K, T, P>(parser: P, input: Cursor<'a, K>) -> Result<T, Failure>
where
    P: Parser<'a, K, T>,
{
    let parsed = parser.parse(input)?;
    match parsed.rest {
        Cursor::End(_) => Ok(parsed.value),
        rest => Err(Failure::Expected(Expectation::at(&rest, "end of input")).merge(parsed.furthest)),
    }
}
