use model::{
    field::FieldType,
    filter::{FilterOperator, operator::ParseOperatorError},
};
use planner::error::QueryError;
use thiserror::Error;

/// Errors raised while compiling a filter into SQL.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// The operand does not have the shape the operator requires.
    #[error("Invalid value for `{operator}` on field `{field}`: {reason}")]
    Validation {
        operator: FilterOperator,
        field: String,
        reason: String,
    },

    /// The operator has no handler for this kind of field.
    #[error("Operator `{operator}` is not supported for {field_type} field `{field}`")]
    UnsupportedOperator {
        operator: FilterOperator,
        field_type: FieldType,
        field: String,
    },

    #[error(transparent)]
    UnknownOperator(#[from] ParseOperatorError),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Query build error: {0}")]
    Query(#[from] QueryError),
}

impl FilterError {
    /// Whether the filter itself is malformed, as opposed to a defect in the
    /// compiler or its configuration. Request handlers report these back to
    /// the client as invalid filters.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FilterError::Validation { .. } | FilterError::UnknownField(_)
        )
    }

    /// Whether the operator could not be dispatched at all.
    pub fn is_dispatch(&self) -> bool {
        matches!(
            self,
            FilterError::UnsupportedOperator { .. } | FilterError::UnknownOperator(_)
        )
    }
}
