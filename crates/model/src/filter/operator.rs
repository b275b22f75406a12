use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};
use thiserror::Error;

/// The predicate kind of a filter item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Is,
    IsNot,
    Contains,
    DoesNotContain,
    IsGreater,
    IsGreaterEqual,
    IsLess,
    IsLessEqual,
    IsEmpty,
    IsNotEmpty,
    IsAnyOf,
    IsNoneOf,
    HasAnyOf,
    HasAllOf,
    HasNoneOf,
    IsExactly,
    IsBefore,
    IsAfter,
    IsOnOrBefore,
    IsOnOrAfter,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown filter operator: {0}")]
pub struct ParseOperatorError(pub String);

lazy_static! {
    static ref OPERATORS_BY_NAME: HashMap<&'static str, FilterOperator> = FilterOperator::ALL
        .iter()
        .map(|op| (op.as_str(), *op))
        .collect();
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 20] = [
        FilterOperator::Is,
        FilterOperator::IsNot,
        FilterOperator::Contains,
        FilterOperator::DoesNotContain,
        FilterOperator::IsGreater,
        FilterOperator::IsGreaterEqual,
        FilterOperator::IsLess,
        FilterOperator::IsLessEqual,
        FilterOperator::IsEmpty,
        FilterOperator::IsNotEmpty,
        FilterOperator::IsAnyOf,
        FilterOperator::IsNoneOf,
        FilterOperator::HasAnyOf,
        FilterOperator::HasAllOf,
        FilterOperator::HasNoneOf,
        FilterOperator::IsExactly,
        FilterOperator::IsBefore,
        FilterOperator::IsAfter,
        FilterOperator::IsOnOrBefore,
        FilterOperator::IsOnOrAfter,
    ];

    /// The wire tag, e.g. `isNoneOf`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Is => "is",
            FilterOperator::IsNot => "isNot",
            FilterOperator::Contains => "contains",
            FilterOperator::DoesNotContain => "doesNotContain",
            FilterOperator::IsGreater => "isGreater",
            FilterOperator::IsGreaterEqual => "isGreaterEqual",
            FilterOperator::IsLess => "isLess",
            FilterOperator::IsLessEqual => "isLessEqual",
            FilterOperator::IsEmpty => "isEmpty",
            FilterOperator::IsNotEmpty => "isNotEmpty",
            FilterOperator::IsAnyOf => "isAnyOf",
            FilterOperator::IsNoneOf => "isNoneOf",
            FilterOperator::HasAnyOf => "hasAnyOf",
            FilterOperator::HasAllOf => "hasAllOf",
            FilterOperator::HasNoneOf => "hasNoneOf",
            FilterOperator::IsExactly => "isExactly",
            FilterOperator::IsBefore => "isBefore",
            FilterOperator::IsAfter => "isAfter",
            FilterOperator::IsOnOrBefore => "isOnOrBefore",
            FilterOperator::IsOnOrAfter => "isOnOrAfter",
        }
    }

    /// Operators whose operand is a list of literals.
    pub fn expects_list(&self) -> bool {
        matches!(
            self,
            FilterOperator::IsAnyOf
                | FilterOperator::IsNoneOf
                | FilterOperator::HasAnyOf
                | FilterOperator::HasAllOf
                | FilterOperator::HasNoneOf
        )
    }

    /// Operators that take no operand.
    pub fn is_nullary(&self) -> bool {
        matches!(self, FilterOperator::IsEmpty | FilterOperator::IsNotEmpty)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OPERATORS_BY_NAME
            .get(s)
            .copied()
            .ok_or_else(|| ParseOperatorError(s.to_string()))
    }
}
