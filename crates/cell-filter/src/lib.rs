//! Compiles typed cell-value filters into parameterized SQL conditions.
//!
//! A [`CellValueFilter`] owns one [`FilterDialect`] and turns a single
//! `(field, operator, value)` triple into a [`CompiledCondition`]: SQL text
//! with `?` markers plus the ordered parameters those markers bind. Operand
//! values never reach the SQL text.

pub mod compiler;
pub mod dialect;
pub mod error;
pub mod operand;
pub mod support;
pub mod translator;

pub use compiler::{CellValueFilter, FilterParams};
pub use dialect::{FilterDialect, postgres::PostgresFilterDialect, sqlite::SqliteFilterDialect};
pub use error::FilterError;
pub use translator::FilterTranslator;

/// A parameterized boolean fragment ready to attach to a query.
pub type CompiledCondition = planner::query::ast::expr::RawSql;
