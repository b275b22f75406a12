use crate::sql::base::error::DbError;
use async_trait::async_trait;
use model::records::row::RowData;
use planner::query::context::QueryContext;

/// A store that can run filtered queries built on a [`QueryContext`].
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Renders `ctx` and returns every matching row.
    async fn fetch_rows(&self, ctx: &QueryContext) -> Result<Vec<RowData>, DbError>;

    /// Runs one or more statements without parameters, e.g. a schema script.
    async fn execute(&self, sql: &str) -> Result<(), DbError>;
}
