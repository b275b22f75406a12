//! Defines the AST for SQL expressions.

use crate::error::QueryError;
use model::core::value::Value;

/// The marker raw fragments use for a bound parameter. The renderer swaps it
/// for the dialect's placeholder.
pub const PARAM_MARKER: char = '?';

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column or table identifier, e.g., `users` or `users.id`.
    Identifier(Ident),

    /// A literal value, always rendered as a bound parameter.
    Value(Value),

    /// A binary operation, e.g., `column = 'value'` or `a AND b`.
    BinaryOp(Box<BinaryOp>),

    /// A function call, e.g., `COUNT(*)` or `MAX(price)`.
    FunctionCall(FunctionCall),

    /// An aliased expression, e.g. `COUNT(*) AS total_count`
    Alias { expr: Box<Expr>, alias: String },

    /// A pre-built boolean fragment with its own bound parameters.
    Raw(RawSql),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 'users' in 'users.id'
    pub name: String,              // e.g., the 'id' in 'users.id'
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub wildcard: bool, // represents the '*' in 'COUNT(*)'
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,    // =
    NotEq, // <>
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=

    // Logical
    And,
    Or,
}

/// A raw SQL fragment using `?` markers for its parameters.
///
/// The marker count (outside quoted literals and identifiers) always equals
/// `params.len()`; `RawSql::new` is the only way to build one.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSql {
    sql: String,
    params: Vec<Value>,
}

impl RawSql {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Result<Self, QueryError> {
        let sql = sql.into();
        if sql.trim().is_empty() {
            return Err(QueryError::EmptyFragment);
        }

        let placeholders = count_markers(&sql);
        if placeholders != params.len() {
            return Err(QueryError::PlaceholderMismatch {
                placeholders,
                params: params.len(),
            });
        }

        Ok(Self { sql, params })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    pub fn placeholder_count(&self) -> usize {
        self.params.len()
    }
}

/// A piece of a raw fragment: literal SQL text or a parameter marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Text(&'a str),
    Marker,
}

/// Splits a raw fragment into text segments and marker positions.
/// Markers inside `'...'` literals or `"..."` identifiers are left alone.
pub(crate) fn segments(sql: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, ch) in sql.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '\'' || ch == '"' => quote = Some(ch),
            None if ch == PARAM_MARKER => {
                out.push(Segment::Text(&sql[start..idx]));
                out.push(Segment::Marker);
                start = idx + ch.len_utf8();
            }
            None => {}
        }
    }
    out.push(Segment::Text(&sql[start..]));
    out
}

fn count_markers(sql: &str) -> usize {
    segments(sql)
        .iter()
        .filter(|s| matches!(s, Segment::Marker))
        .count()
}
