use crate::sql::{
    base::{error::DbError, source::RecordSource},
    sqlite::{params::bind_values, row::DbRow},
};
use async_trait::async_trait;
use model::records::row::RowData;
use planner::query::{context::QueryContext, dialect};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tracing::{debug, info};

const DEFAULT_POOL_SIZE: u32 = 5;

#[derive(Clone)]
pub struct SqliteAdapter {
    pool: SqlitePool,
    dialect: dialect::Sqlite,
}

impl SqliteAdapter {
    /// Opens a pool for `url`. An in-memory database lives in a single
    /// connection, so its pool is capped at one connection that never
    /// expires.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(DEFAULT_POOL_SIZE)
        };

        let pool = options.connect(url).await?;
        info!("Connected to SQLite at {}", url);

        Ok(SqliteAdapter {
            pool,
            dialect: dialect::Sqlite,
        })
    }
}

#[async_trait]
impl RecordSource for SqliteAdapter {
    async fn fetch_rows(&self, ctx: &QueryContext) -> Result<Vec<RowData>, DbError> {
        let (sql, params) = ctx.render(&self.dialect);
        debug!(sql = %sql, params = params.len(), "fetch rows");

        let rows = bind_values(sqlx::query(&sql), &params)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| DbRow(row).to_row_data(&ctx.table().name))
            .collect()
    }

    async fn execute(&self, sql: &str) -> Result<(), DbError> {
        sqlx::raw_sql(sql).execute(&self.pool).await?;
        Ok(())
    }
}
