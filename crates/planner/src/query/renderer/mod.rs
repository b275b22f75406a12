//! Defines the core rendering trait and context for converting AST to SQL.

use model::core::value::Value;

use crate::query::{
    ast::{
        common::TableRef,
        expr::{RawSql, Segment, segments},
    },
    dialect::Dialect,
};

pub mod expr;
pub mod select;

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// A context that holds the state during the rendering process.
///
/// It accumulates the SQL string and the parameters, and provides
/// access to the dialect for syntax-specific details.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
        }
    }

    /// Consumes the renderer and returns the final SQL string and parameters.
    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    pub fn add_param(&mut self, value: Value) {
        self.params.push(value);
        let placeholder = self.dialect.get_placeholder(self.params.len() - 1);
        self.sql.push_str(&placeholder);
    }

    /// Appends a raw fragment, turning each `?` marker into the dialect's
    /// placeholder for the fragment's next parameter.
    pub fn push_raw(&mut self, raw: &RawSql) {
        let mut params = raw.params().iter();
        for segment in segments(raw.sql()) {
            match segment {
                Segment::Text(text) => self.sql.push_str(text),
                Segment::Marker => match params.next() {
                    Some(param) => self.add_param(param.clone()),
                    None => self.sql.push('?'),
                },
            }
        }
    }

    pub fn render_table_ref(&mut self, table: &TableRef) {
        if let Some(schema) = &table.schema {
            self.sql.push_str(&self.dialect.quote_identifier(schema));
            self.sql.push('.');
        }
        self.sql.push_str(&self.dialect.quote_identifier(&table.name));
    }
}
