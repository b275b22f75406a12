use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A primitive operand literal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl Literal {
    /// Converts the literal to a parameter value without type coercion.
    /// Integral numbers stay integers.
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Bool(b) => Value::Boolean(*b),
            Literal::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            Literal::String(s) => Value::String(s.clone()),
        }
    }

    /// The literal as text, the form it takes when compared against a text
    /// column.
    pub fn to_text(&self) -> String {
        match self {
            Literal::Bool(b) => b.to_string(),
            Literal::Number(n) => n.to_string(),
            Literal::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{s:?}"),
            other => f.write_str(&other.to_text()),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Number(n.into())
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

/// The operand of a filter item: nothing, one literal, or a list of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterValue {
    #[default]
    Null,
    Literal(Literal),
    List(Vec<Literal>),
}

impl FilterValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FilterValue::Null => "null",
            FilterValue::Literal(_) => "scalar",
            FilterValue::List(_) => "list",
        }
    }

    pub fn list<I, L>(items: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        FilterValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Literal> for FilterValue {
    fn from(literal: Literal) -> Self {
        FilterValue::Literal(literal)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Literal(s.into())
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Literal(n.into())
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Literal(b.into())
    }
}
