//! Typestate builder for the record `Select` a filter is attached to.
//!
//! The state parameter only allows a projection first and a table second;
//! filtering and paging clauses become available once both are set.

use crate::query::ast::{
    common::{OrderDir, TableRef},
    expr::Expr,
    select::{FromClause, OrderByExpr, Select},
};
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy)]
pub struct Empty;

#[derive(Debug, Clone, Copy)]
pub struct Projected;

#[derive(Debug, Clone, Copy)]
pub struct Sourced;

#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    ast: Select,
    state: PhantomData<State>,
}

impl<State> SelectBuilder<State> {
    fn advance<Next>(self) -> SelectBuilder<Next> {
        SelectBuilder {
            ast: self.ast,
            state: PhantomData,
        }
    }
}

impl Default for SelectBuilder<Empty> {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectBuilder<Empty> {
    pub fn new() -> Self {
        Self {
            ast: Select::default(),
            state: PhantomData,
        }
    }

    /// Sets the projection. An empty list selects `*`.
    pub fn select(mut self, columns: Vec<Expr>) -> SelectBuilder<Projected> {
        self.ast.columns = columns;
        self.advance()
    }
}

impl SelectBuilder<Projected> {
    /// Sets the record table and the alias its columns are qualified with.
    pub fn from(mut self, table: TableRef, alias: Option<&str>) -> SelectBuilder<Sourced> {
        self.ast.from = Some(FromClause {
            table,
            alias: alias.map(String::from),
        });
        self.advance()
    }
}

impl SelectBuilder<Sourced> {
    /// Replaces the condition; callers fold multiple conditions beforehand.
    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(condition);
        self
    }

    pub fn order_by(mut self, expr: Expr, direction: Option<OrderDir>) -> Self {
        self.ast.order_by.push(OrderByExpr { expr, direction });
        self
    }

    pub fn limit(mut self, limit: Expr) -> Self {
        self.ast.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: Expr) -> Self {
        self.ast.offset = Some(offset);
        self
    }

    pub fn build(self) -> Select {
        self.ast
    }
}
