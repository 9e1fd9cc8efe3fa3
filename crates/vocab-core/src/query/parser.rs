//! Combinator grammar for the query language.

use std::rc::Rc;

use super::ast::{BoolExpr, CompareOp, NumericField, Query, SortKey, SortOrder, TransformStmt};
use super::error::{QueryParseError, QueryResult};
use super::lexer::{unescape, QueryToken, QUERY_LEXER};
use crate::combinator::{
    alt, map, opt, parse_all, preceded, repeat, sep_by1, seq, tok, tok_text, try_map, PResult,
};
use crate::lexer::{Cursor, Position, Token};
use crate::markup::parse_markup;
use crate::model::WordInfo;

type Input<'a> = Cursor<'a, QueryToken>;
type Res<'a, T> = PResult<'a, QueryToken, T>;

/// Parser for the query box.
///
/// # Grammar
///
/// ```text
/// query      ::= insert | session | dump | filter
/// insert     ::= ("insert" | "+") definition (";" definition)* ";"?
/// definition ::= STRING STRING? TAG*
/// session    ::= "session"
/// dump       ::= "dump" | "export"
/// filter     ::= expr? ("|" stmt)*
/// expr       ::= and_expr ("or" and_expr)*
/// and_expr   ::= unary (("and" | "&") unary)*
/// unary      ::= ("not" | "!") unary | primary
/// primary    ::= "(" expr ")" | predicate
/// predicate  ::= "*" | "all" | "reviewed" | TAG
///              | "tag" ":" value
///              | ("word" | "content") ":" value
///              | ("desc" | "description") ":" value
///              | "text" ":" value
///              | ("reviews" | "days") COMPARE NUMBER
/// value      ::= STRING | IDENT | NUMBER
/// stmt       ::= "limit" "(" NUMBER ")" | "skip" "(" NUMBER ")"
///              | "sort" "(" sort_key ("," ("asc" | "desc"))? ")"
///              | "shuffle" ("(" ")")? | "reverse" ("(" ")")?
/// sort_key   ::= "reviews" | "last" | "word" | "description"
/// ```
///
/// Alternatives are tried in order and the first success wins. Keywords are
/// case-insensitive.
///
/// # Operator Precedence (highest to lowest)
///
/// 1. `not` / `!`
/// 2. `and` / `&`, left-associative
/// 3. `or`, left-associative
///
/// # Example
///
/// ```
/// use vocab_core::query::{BoolExpr, Query, QueryParser};
///
/// let query = QueryParser::parse("#verb and not reviewed").unwrap();
/// assert!(matches!(query, Query::Filter { expr: BoolExpr::And(_, _), .. }));
///
/// let query = QueryParser::parse("session").unwrap();
/// assert_eq!(query, Query::NewSession);
/// ```
pub struct QueryParser;

impl QueryParser {
    /// Parses a query string.
    ///
    /// An empty (or all-whitespace) query selects every word.
    ///
    /// # Errors
    ///
    /// Returns `QueryParseError::Tokenize` for text no token rule matches,
    /// `QueryParseError::Syntax` when the tokens do not fit the grammar, and
    /// `QueryParseError::Markup` when an inserted word's content has
    /// unbalanced parentheses, and `QueryParseError::TooDeep` when groups
    /// and negations nest more than [`MAX_NESTING`] levels.
    pub fn parse(input: &str) -> QueryResult<Query> {
        let cursor = QUERY_LEXER.parse(input)?;
        check_nesting(&cursor)?;
        let query = match parse_all(command, cursor)? {
            Command::Ready(query) => query,
            Command::Insert(definitions) => Query::Insert {
                words: definitions
                    .into_iter()
                    .map(Definition::into_word_info)
                    .collect::<QueryResult<_>>()?,
            },
        };
        tracing::debug!(?query, "parsed query");
        Ok(query)
    }
}

/// Deepest nesting a query may use. Every `(` and every `not` / `!` in a
/// chain of negations counts as one level.
pub const MAX_NESTING: usize = 32;

/// Most `and` / `&` / `or` operators a query may use. Chains fold into a
/// left-leaning tree, so this bounds the depth of the parsed expression.
pub const MAX_OPERATORS: usize = 256;

/// Rejects queries whose grouping would recurse past [`MAX_NESTING`] or
/// whose expression tree would grow past [`MAX_OPERATORS`].
///
/// Runs over the memoized token stream before the grammar, so the grammar
/// reuses the tokens scanned here. Tokenize errors are left for the grammar
/// to report.
fn check_nesting(start: &Input<'_>) -> QueryResult<()> {
    // Levels opened by each unclosed `(`, including the negations before it.
    let mut groups: Vec<usize> = Vec::new();
    let mut depth = 0;
    let mut negations = 0;
    let mut operators = 0;

    let mut cursor = start.clone();
    while let Cursor::Token(token) = cursor {
        match token.kind {
            QueryToken::Bang => negations += 1,
            QueryToken::Ident if token.text.eq_ignore_ascii_case("not") => negations += 1,
            QueryToken::LParen => {
                groups.push(negations + 1);
                depth += negations + 1;
                negations = 0;
            }
            QueryToken::RParen => {
                if let Some(levels) = groups.pop() {
                    depth -= levels;
                }
                negations = 0;
            }
            QueryToken::Amp => {
                operators += 1;
                negations = 0;
            }
            QueryToken::Ident
                if token.text.eq_ignore_ascii_case("and") || token.text.eq_ignore_ascii_case("or") =>
            {
                operators += 1;
                negations = 0;
            }
            _ => negations = 0,
        }

        if operators > MAX_OPERATORS {
            return Err(QueryParseError::TooLong {
                position: token.position,
                limit: MAX_OPERATORS,
            });
        }

        if depth + negations > MAX_NESTING {
            return Err(QueryParseError::TooDeep {
                position: token.position,
                limit: MAX_NESTING,
            });
        }

        cursor = match token.next() {
            Ok(next) => next,
            Err(_) => break,
        };
    }
    Ok(())
}

/// Shorthand for [`QueryParser::parse`].
pub fn parse_query(input: &str) -> QueryResult<Query> {
    QueryParser::parse(input)
}

/// Result of the grammar pass. Insert definitions still carry raw content
/// markup, which is parsed once the whole query is known to be well-formed.
enum Command {
    Insert(Vec<Definition>),
    Ready(Query),
}

struct Definition {
    content: String,
    position: Position,
    description: String,
    tags: Vec<String>,
}

impl Definition {
    fn into_word_info(self) -> QueryResult<WordInfo> {
        let content =
            parse_markup(&self.content).map_err(|err| QueryParseError::markup(self.position, err))?;
        Ok(WordInfo::new(content, self.description, self.tags))
    }
}

fn keyword<'a>(name: &'static str) -> impl Fn(Input<'a>) -> Res<'a, Rc<Token<'a, QueryToken>>> {
    tok_text(QueryToken::Ident, name)
}

fn tag_name(token: &Token<'_, QueryToken>) -> String {
    token.text.trim_start_matches('#').to_string()
}

fn command(input: Input<'_>) -> Res<'_, Command> {
    alt((
        insert,
        map(keyword("session"), |_| Command::Ready(Query::NewSession)),
        map(alt((keyword("dump"), keyword("export"))), |_| {
            Command::Ready(Query::Dump)
        }),
        filter,
    ))(input)
}

// ==================== Insert ====================

fn insert(input: Input<'_>) -> Res<'_, Command> {
    map(
        seq((
            alt((keyword("insert"), tok(QueryToken::Plus))),
            sep_by1(definition, tok(QueryToken::Semicolon)),
            opt(tok(QueryToken::Semicolon)),
        )),
        |(_, definitions, _)| Command::Insert(definitions),
    )(input)
}

fn definition(input: Input<'_>) -> Res<'_, Definition> {
    map(
        seq((
            tok(QueryToken::Str),
            opt(tok(QueryToken::Str)),
            repeat(tok(QueryToken::Tag), 0, None),
        )),
        |(content, description, tags)| Definition {
            content: unescape(content.text),
            position: content.position,
            description: description
                .map(|d| unescape(d.text))
                .unwrap_or_default(),
            tags: tags.iter().map(|t| tag_name(t)).collect(),
        },
    )(input)
}

// ==================== Filter ====================

fn filter(input: Input<'_>) -> Res<'_, Command> {
    map(
        seq((
            opt(expr),
            repeat(preceded(tok(QueryToken::Pipe), stmt), 0, None),
        )),
        |(expr, stmts)| {
            Command::Ready(Query::Filter {
                expr: expr.unwrap_or(BoolExpr::All),
                stmts,
            })
        },
    )(input)
}

fn expr(input: Input<'_>) -> Res<'_, BoolExpr> {
    map(
        seq((and_expr, repeat(preceded(keyword("or"), and_expr), 0, None))),
        |(first, rest)| rest.into_iter().fold(first, BoolExpr::or),
    )(input)
}

fn and_expr(input: Input<'_>) -> Res<'_, BoolExpr> {
    map(
        seq((
            unary,
            repeat(
                preceded(alt((keyword("and"), tok(QueryToken::Amp))), unary),
                0,
                None,
            ),
        )),
        |(first, rest)| rest.into_iter().fold(first, BoolExpr::and),
    )(input)
}

fn unary(input: Input<'_>) -> Res<'_, BoolExpr> {
    alt((
        map(
            preceded(alt((keyword("not"), tok(QueryToken::Bang))), unary),
            BoolExpr::negate,
        ),
        primary,
    ))(input)
}

fn primary(input: Input<'_>) -> Res<'_, BoolExpr> {
    alt((
        map(
            seq((tok(QueryToken::LParen), expr, tok(QueryToken::RParen))),
            |(_, inner, _)| inner,
        ),
        predicate,
    ))(input)
}

fn predicate(input: Input<'_>) -> Res<'_, BoolExpr> {
    alt((
        map(alt((tok(QueryToken::Star), keyword("all"))), |_| BoolExpr::All),
        map(keyword("reviewed"), |_| BoolExpr::Reviewed),
        map(tok(QueryToken::Tag), |t| BoolExpr::HasTag(tag_name(&t))),
        field_predicate,
        comparison,
    ))(input)
}

fn field_predicate(input: Input<'_>) -> Res<'_, BoolExpr> {
    alt((
        map(
            preceded(seq((keyword("tag"), tok(QueryToken::Colon))), value),
            BoolExpr::HasTag,
        ),
        map(
            preceded(
                seq((
                    alt((keyword("word"), keyword("content"))),
                    tok(QueryToken::Colon),
                )),
                value,
            ),
            BoolExpr::ContentContains,
        ),
        map(
            preceded(
                seq((
                    alt((keyword("desc"), keyword("description"))),
                    tok(QueryToken::Colon),
                )),
                value,
            ),
            BoolExpr::DescriptionContains,
        ),
        map(
            preceded(seq((keyword("text"), tok(QueryToken::Colon))), value),
            BoolExpr::TextContains,
        ),
    ))(input)
}

fn value(input: Input<'_>) -> Res<'_, String> {
    alt((
        map(tok(QueryToken::Str), |t| unescape(t.text)),
        map(tok(QueryToken::Ident), |t| t.text.to_string()),
        map(tok(QueryToken::Number), |t| t.text.to_string()),
    ))(input)
}

fn comparison(input: Input<'_>) -> Res<'_, BoolExpr> {
    map(
        seq((
            alt((
                map(keyword("reviews"), |_| NumericField::ReviewCount),
                map(keyword("days"), |_| NumericField::DaysSinceReview),
            )),
            try_map(tok(QueryToken::Compare), "comparison operator", |t| {
                CompareOp::from_symbol(t.text)
            }),
            integer,
        )),
        |(field, op, value)| BoolExpr::Compare { field, op, value },
    )(input)
}

fn integer(input: Input<'_>) -> Res<'_, i64> {
    try_map(tok(QueryToken::Number), "number", |t| t.text.parse().ok())(input)
}

fn count(input: Input<'_>) -> Res<'_, usize> {
    try_map(tok(QueryToken::Number), "number", |t| t.text.parse().ok())(input)
}

// ==================== Pipeline ====================

fn stmt(input: Input<'_>) -> Res<'_, TransformStmt> {
    alt((
        map(
            seq((
                keyword("limit"),
                tok(QueryToken::LParen),
                count,
                tok(QueryToken::RParen),
            )),
            |(_, _, n, _)| TransformStmt::Limit(n),
        ),
        map(
            seq((
                keyword("skip"),
                tok(QueryToken::LParen),
                count,
                tok(QueryToken::RParen),
            )),
            |(_, _, n, _)| TransformStmt::Skip(n),
        ),
        sort,
        map(seq((keyword("shuffle"), opt(empty_parens))), |_| {
            TransformStmt::Shuffle
        }),
        map(seq((keyword("reverse"), opt(empty_parens))), |_| {
            TransformStmt::Reverse
        }),
    ))(input)
}

fn empty_parens(input: Input<'_>) -> Res<'_, ()> {
    map(
        seq((tok(QueryToken::LParen), tok(QueryToken::RParen))),
        |_| (),
    )(input)
}

fn sort(input: Input<'_>) -> Res<'_, TransformStmt> {
    map(
        seq((
            keyword("sort"),
            tok(QueryToken::LParen),
            sort_key,
            opt(preceded(tok(QueryToken::Comma), sort_order)),
            tok(QueryToken::RParen),
        )),
        |(_, _, key, order, _)| TransformStmt::SortBy {
            key,
            order: order.unwrap_or_default(),
        },
    )(input)
}

fn sort_key(input: Input<'_>) -> Res<'_, SortKey> {
    alt((
        map(keyword("reviews"), |_| SortKey::ReviewCount),
        map(keyword("last"), |_| SortKey::LastReviewed),
        map(keyword("word"), |_| SortKey::Word),
        map(keyword("description"), |_| SortKey::Description),
    ))(input)
}

fn sort_order(input: Input<'_>) -> Res<'_, SortOrder> {
    alt((
        map(keyword("asc"), |_| SortOrder::Ascending),
        map(keyword("desc"), |_| SortOrder::Descending),
    ))(input)
}
