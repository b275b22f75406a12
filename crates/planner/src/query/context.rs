//! The query a filter compiler attaches its conditions to.

use crate::{
    error::QueryError,
    query::{
        ast::{
            common::{OrderDir, TableRef},
            expr::{BinaryOp, BinaryOperator, Expr, RawSql},
            select::Select,
        },
        builder::select::SelectBuilder,
        dialect::Dialect,
        renderer::{Render, Renderer},
        value,
    },
};
use model::core::value::Value;
use tracing::trace;

/// Per-query construction state: the target table and alias plus every
/// condition attached so far. Conditions are AND-ed in the order they were
/// attached, which is also the order their parameters bind in.
#[derive(Debug, Clone)]
pub struct QueryContext {
    table: TableRef,
    alias: Option<String>,
    columns: Vec<Expr>,
    conditions: Vec<Expr>,
    order_by: Vec<(Expr, Option<OrderDir>)>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl QueryContext {
    pub fn new(table: &str) -> Self {
        Self {
            table: TableRef::new(table),
            alias: None,
            columns: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The name columns are qualified with: the alias if set, else the table.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table.name)
    }

    pub fn select(&mut self, columns: Vec<Expr>) -> &mut Self {
        self.columns = columns;
        self
    }

    /// Attaches a raw boolean fragment. Fails if the fragment's `?` markers
    /// do not match `params`.
    pub fn where_raw(
        &mut self,
        sql: impl Into<String>,
        params: Vec<Value>,
    ) -> Result<&mut Self, QueryError> {
        let raw = RawSql::new(sql, params)?;
        Ok(self.where_condition(raw))
    }

    pub fn where_condition(&mut self, raw: RawSql) -> &mut Self {
        trace!(sql = raw.sql(), params = raw.params().len(), "attach condition");
        self.where_expr(Expr::Raw(raw))
    }

    pub fn where_expr(&mut self, expr: Expr) -> &mut Self {
        self.conditions.push(expr);
        self
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    pub fn order_by(&mut self, expr: Expr, direction: Option<OrderDir>) -> &mut Self {
        self.order_by.push((expr, direction));
        self
    }

    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: i64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// Folds all attached conditions into one `AND` chain.
    pub fn where_clause(&self) -> Option<Expr> {
        let mut conditions = self.conditions.iter().cloned();
        let first = conditions.next()?;
        Some(conditions.fold(first, |left, right| {
            Expr::BinaryOp(Box::new(BinaryOp {
                left,
                op: BinaryOperator::And,
                right,
            }))
        }))
    }

    pub fn to_select(&self) -> Select {
        let mut builder = SelectBuilder::new()
            .select(self.columns.clone())
            .from(self.table.clone(), self.alias.as_deref());

        if let Some(condition) = self.where_clause() {
            builder = builder.where_clause(condition);
        }
        for (expr, direction) in &self.order_by {
            builder = builder.order_by(expr.clone(), direction.clone());
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(value(Value::Int(limit)));
        }
        if let Some(offset) = self.offset {
            builder = builder.offset(value(Value::Int(offset)));
        }

        builder.build()
    }

    /// Renders the full statement for `dialect`.
    pub fn render(&self, dialect: &dyn Dialect) -> (String, Vec<Value>) {
        let mut renderer = Renderer::new(dialect);
        self.to_select().render(&mut renderer);
        renderer.finish()
    }
}
