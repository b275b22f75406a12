//! Engine-specific SQL syntax used by the shared operator core.

use model::{
    field::{CellValueType, FieldDescriptor, FieldType},
    filter::FilterOperator,
};
use planner::query::{context::QueryContext, dialect::Dialect};

pub mod postgres;
pub mod sqlite;

/// Correlation name of the unnested JSON row view. Both dialects expose the
/// current array element as `json_each.value`.
pub const UNNEST_ALIAS: &str = "json_each";

/// Where the JSON document a filter tests comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonObject {
    /// The field's own column holds one JSON object.
    Column,
    /// One element of the field's JSON array, read from the unnested row view.
    Unnested,
}

/// A resolved JSON operand: the document plus the key to extract, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonReference {
    pub object: JsonObject,
    pub key: Option<&'static str>,
}

impl JsonReference {
    /// The SQLite/JSONPath form of the key, e.g. `$.id`.
    pub fn path(&self) -> Option<String> {
        self.key.map(|key| format!("$.{key}"))
    }
}

/// Decides which JSON value a filter on `field` compares against.
///
/// Links are matched by id, except that substring search runs on the
/// display title. Users are always matched by id. Attachments, and any other
/// JSON-valued field, compare the raw array element.
pub fn json_reference(field: &FieldDescriptor, operator: FilterOperator) -> JsonReference {
    let object = if field.is_multiple() {
        JsonObject::Unnested
    } else {
        JsonObject::Column
    };

    match field.field_type {
        FieldType::Link => JsonReference {
            object,
            key: Some(match operator {
                FilterOperator::Contains | FilterOperator::DoesNotContain => "title",
                _ => "id",
            }),
        },
        FieldType::User => JsonReference {
            object,
            key: Some("id"),
        },
        _ => JsonReference {
            object: JsonObject::Unnested,
            key: None,
        },
    }
}

/// `?, ?, ?` for `count` bound values.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// SQL syntax hooks for one relational engine.
///
/// Every returned fragment uses `?` as its parameter marker; the planner's
/// renderer turns those into the engine's own placeholders.
pub trait FilterDialect: Send + Sync {
    /// The planner dialect used for identifier quoting and placeholders.
    fn sql_dialect(&self) -> &dyn Dialect;

    fn name(&self) -> String {
        self.sql_dialect().name()
    }

    /// `"<alias or table>"."<db field name>"`.
    fn resolve_db_column_reference(&self, ctx: &QueryContext, field: &FieldDescriptor) -> String {
        let dialect = self.sql_dialect();
        format!(
            "{}.{}",
            dialect.quote_identifier(ctx.qualifier()),
            dialect.quote_identifier(&field.db_field_name)
        )
    }

    /// The expression yielding the JSON value under test for `field`. See
    /// [`json_reference`] for which document and key are read.
    fn resolve_json_column_reference(
        &self,
        ctx: &QueryContext,
        field: &FieldDescriptor,
        operator: FilterOperator,
    ) -> String;

    /// The `FROM` source producing one row per element of the JSON array in
    /// `column`, exposed as `json_each.value`.
    fn unnest_json_array(&self, column: &str) -> String;

    fn json_array_length(&self, column: &str) -> String;

    /// Treats SQL NULL as the empty string.
    fn coalesce_empty(&self, expr: &str) -> String;

    /// The substring-match operator.
    fn like_operator(&self) -> &'static str;

    /// NULL-safe `column <> ?`: a NULL cell is never equal to the operand.
    fn is_not_condition(&self, column: &str, cell_value_type: CellValueType) -> String;

    /// NULL-safe `column NOT LIKE ?`.
    fn does_not_contain_condition(&self, column: &str) -> String;

    /// NULL-safe `column NOT IN (<placeholders>)`.
    fn is_none_of_condition(
        &self,
        column: &str,
        cell_value_type: CellValueType,
        placeholders: &str,
    ) -> String;
}
