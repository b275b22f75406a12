use super::{FilterDialect, JsonObject, UNNEST_ALIAS, json_reference};
use model::{
    field::{CellValueType, FieldDescriptor},
    filter::FilterOperator,
};
use planner::query::{
    context::QueryContext,
    dialect::{Dialect, Postgres},
};

/// PostgreSQL syntax for `jsonb` cells.
///
/// Text comparisons coalesce NULL to `''` like SQLite does. Typed columns
/// cannot be coalesced to a string, so they use `IS DISTINCT FROM` and an
/// explicit `IS NULL` branch, which select the same rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresFilterDialect {
    dialect: Postgres,
}

impl PostgresFilterDialect {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FilterDialect for PostgresFilterDialect {
    fn sql_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn resolve_json_column_reference(
        &self,
        ctx: &QueryContext,
        field: &FieldDescriptor,
        operator: FilterOperator,
    ) -> String {
        let reference = json_reference(field, operator);
        let object = match reference.object {
            JsonObject::Column => self.resolve_db_column_reference(ctx, field),
            JsonObject::Unnested => format!("{UNNEST_ALIAS}.value"),
        };
        match (reference.key, field.cell_value_type) {
            (Some(key), _) => format!("{object} ->> '{key}'"),
            // Scalar elements unwrap to text; typed arrays are cast back so
            // that numeric and boolean operands compare by value.
            (None, CellValueType::Number) => format!("({object} #>> '{{}}')::numeric"),
            (None, CellValueType::Boolean) => format!("({object} #>> '{{}}')::boolean"),
            (None, _) => format!("{object} #>> '{{}}'"),
        }
    }

    fn unnest_json_array(&self, column: &str) -> String {
        format!("jsonb_array_elements({column}) AS {UNNEST_ALIAS}(value)")
    }

    fn json_array_length(&self, column: &str) -> String {
        format!("jsonb_array_length({column})")
    }

    fn coalesce_empty(&self, expr: &str) -> String {
        format!("coalesce({expr}, '')")
    }

    fn like_operator(&self) -> &'static str {
        "ILIKE"
    }

    fn is_not_condition(&self, column: &str, cell_value_type: CellValueType) -> String {
        match cell_value_type {
            CellValueType::String => format!("{} <> ?", self.coalesce_empty(column)),
            _ => format!("{column} IS DISTINCT FROM ?"),
        }
    }

    fn does_not_contain_condition(&self, column: &str) -> String {
        format!("{} NOT ILIKE ?", self.coalesce_empty(column))
    }

    fn is_none_of_condition(
        &self,
        column: &str,
        cell_value_type: CellValueType,
        placeholders: &str,
    ) -> String {
        match cell_value_type {
            CellValueType::String => {
                format!("{} NOT IN ({placeholders})", self.coalesce_empty(column))
            }
            _ => format!("({column} IS NULL OR {column} NOT IN ({placeholders}))"),
        }
    }
}
