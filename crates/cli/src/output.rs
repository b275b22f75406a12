use crate::error::CliError;
use model::{
    core::value::Value, field::FieldDescriptor, filter::FilterOperator, records::row::RowData,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CompiledQuery {
    pub dialect: String,
    pub sql: String,
    pub params: Vec<serde_json::Value>,
}

impl CompiledQuery {
    pub fn new(dialect: String, sql: String, params: &[Value]) -> Self {
        Self {
            dialect,
            sql,
            params: params.iter().map(Value::to_json).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSupport {
    pub field_type: model::field::FieldType,
    pub multiple: bool,
    pub operators: Vec<FilterOperator>,
}

impl OperatorSupport {
    pub fn for_field(field: &FieldDescriptor) -> Self {
        Self {
            field_type: field.field_type,
            multiple: field.is_multiple(),
            operators: cell_filter::support::supported_operators(field).to_vec(),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(CliError::JsonSerialize)?;
    println!("{json}");
    Ok(())
}

pub fn print_rows(rows: &[RowData]) -> Result<(), CliError> {
    let rows: Vec<serde_json::Value> = rows.iter().map(RowData::to_json).collect();
    print_json(&rows)
}
