use super::{FilterDialect, JsonObject, UNNEST_ALIAS, json_reference};
use model::{
    field::{CellValueType, FieldDescriptor},
    filter::FilterOperator,
};
use planner::query::{
    context::QueryContext,
    dialect::{Dialect, Sqlite},
};

/// SQLite syntax: `ifnull`, the JSON1 functions and case-insensitive `like`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteFilterDialect {
    dialect: Sqlite,
}

impl SqliteFilterDialect {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FilterDialect for SqliteFilterDialect {
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
        match reference.path() {
            Some(path) => format!("json_extract({object}, '{path}')"),
            None => object,
        }
    }

    fn unnest_json_array(&self, column: &str) -> String {
        format!("{UNNEST_ALIAS}({column})")
    }

    fn json_array_length(&self, column: &str) -> String {
        format!("json_array_length({column})")
    }

    fn coalesce_empty(&self, expr: &str) -> String {
        format!("ifnull({expr}, '')")
    }

    fn like_operator(&self) -> &'static str {
        "like"
    }

    // SQLite never equates '' with a number, so coalescing is safe for
    // every cell type.
    fn is_not_condition(&self, column: &str, _cell_value_type: CellValueType) -> String {
        format!("{} != ?", self.coalesce_empty(column))
    }

    fn does_not_contain_condition(&self, column: &str) -> String {
        format!("{} not like ?", self.coalesce_empty(column))
    }

    fn is_none_of_condition(
        &self,
        column: &str,
        _cell_value_type: CellValueType,
        placeholders: &str,
    ) -> String {
        format!("{} not in ({placeholders})", self.coalesce_empty(column))
    }
}
