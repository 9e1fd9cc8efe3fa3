//! Abstract Syntax Tree (AST) for queries.

use crate::model::WordInfo;

/// A parsed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Adds new words to the collection.
    Insert {
        /// The definitions, in input order.
        words: Vec<WordInfo>,
    },

    /// Selects words and runs them through a pipeline.
    Filter {
        /// Which words to keep.
        expr: BoolExpr,
        /// Transformations applied to the kept words, in order.
        stmts: Vec<TransformStmt>,
    },

    /// Starts a new review session.
    NewSession,

    /// Exports the whole collection.
    Dump,
}

/// A boolean predicate over a single word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoolExpr {
    // ==================== Predicates ====================
    /// Matches every word.
    All,

    /// Matches words reviewed in the current session.
    Reviewed,

    /// Matches words carrying the tag (case-sensitive).
    HasTag(String),

    /// Case-insensitive substring of the content text.
    ContentContains(String),

    /// Case-insensitive substring of the description.
    DescriptionContains(String),

    /// Case-insensitive substring of the content text or the description.
    TextContains(String),

    /// Compares a numeric attribute of the word against a constant.
    Compare {
        /// The attribute.
        field: NumericField,
        /// The comparison.
        op: CompareOp,
        /// The constant on the right-hand side.
        value: i64,
    },

    // ==================== Boolean Operators ====================
    /// Logical AND of two expressions.
    And(Box<BoolExpr>, Box<BoolExpr>),

    /// Logical OR of two expressions.
    Or(Box<BoolExpr>, Box<BoolExpr>),

    /// Logical NOT of an expression.
    Not(Box<BoolExpr>),
}

impl BoolExpr {
    /// Creates an AND expression.
    ///
    /// # Example
    ///
    /// ```
    /// use vocab_core::query::BoolExpr;
    ///
    /// let expr = BoolExpr::and(BoolExpr::Reviewed, BoolExpr::HasTag("verb".into()));
    /// assert!(matches!(expr, BoolExpr::And(_, _)));
    /// ```
    pub fn and(left: BoolExpr, right: BoolExpr) -> Self {
        BoolExpr::And(Box::new(left), Box::new(right))
    }

    /// Creates an OR expression.
    pub fn or(left: BoolExpr, right: BoolExpr) -> Self {
        BoolExpr::Or(Box::new(left), Box::new(right))
    }

    /// Creates a NOT expression.
    pub fn negate(inner: BoolExpr) -> Self {
        BoolExpr::Not(Box::new(inner))
    }
}

/// Numeric word attributes usable in comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    /// `reviews`: total number of reviews.
    ReviewCount,
    /// `days`: whole days since the last review. Infinite if never reviewed.
    DaysSinceReview,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Parses an operator token.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" | "==" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Ne),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Le),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Ge),
            _ => None,
        }
    }

    /// Applies the operator. `None` on the left stands for an infinitely
    /// large value.
    pub fn holds(self, left: Option<i64>, right: i64) -> bool {
        let Some(left) = left else {
            return matches!(self, CompareOp::Ne | CompareOp::Gt | CompareOp::Ge);
        };
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
        }
    }
}

/// A pipeline stage applied to the filtered words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformStmt {
    /// Keeps the first n words.
    Limit(usize),
    /// Drops the first n words.
    Skip(usize),
    /// Stable sort.
    SortBy {
        /// What to sort on.
        key: SortKey,
        /// Direction.
        order: SortOrder,
    },
    /// Random permutation.
    Shuffle,
    /// Reverses the order.
    Reverse,
}

/// Sort keys for [`TransformStmt::SortBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// `reviews`
    ReviewCount,
    /// `last`: never-reviewed words come first when ascending.
    LastReviewed,
    /// `word`: content text, case-insensitive.
    Word,
    /// `description`, case-insensitive.
    Description,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}
