use planner::error::QueryError;
use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Any SQL driver error, including connection setup.
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    /// An error occurred while building a SQL query.
    #[error("Query build error: {0}")]
    QueryBuild(#[from] QueryError),

    /// A column value could not be turned into a [`model::core::value::Value`].
    #[error("Decode error: {0}")]
    Decode(String),
}
