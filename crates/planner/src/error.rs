use thiserror::Error;

/// Errors raised while assembling a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A raw fragment's `?` markers do not line up with its parameters.
    #[error("Raw SQL fragment has {placeholders} placeholder(s) but {params} parameter(s)")]
    PlaceholderMismatch { placeholders: usize, params: usize },

    #[error("Raw SQL fragment is empty")]
    EmptyFragment,
}
