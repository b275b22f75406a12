use crate::sql::base::error::DbError;
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use sqlx::{Column, Row, TypeInfo, ValueRef, sqlite::SqliteRow};
use tracing::warn;

/// Decodes SQLite rows by the storage class of each value, since SQLite
/// columns are dynamically typed.
pub struct DbRow<'a>(pub &'a SqliteRow);

impl DbRow<'_> {
    pub fn to_row_data(&self, table: &str) -> Result<RowData, DbError> {
        let field_values = self
            .columns()
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                Ok(FieldValue {
                    value: self.get_value(idx)?,
                    name,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(RowData::new(table, field_values))
    }

    pub fn columns(&self) -> Vec<String> {
        self.0
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect()
    }

    /// The storage class of the value at `idx`: `NULL`, `INTEGER`, `REAL`,
    /// `TEXT` or `BLOB`.
    pub fn storage_class(&self, idx: usize) -> Result<String, DbError> {
        let raw = self.0.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok("NULL".to_string());
        }
        Ok(raw.type_info().name().to_string())
    }

    pub fn get_value(&self, idx: usize) -> Result<Option<Value>, DbError> {
        let value = match self.storage_class(idx)?.as_str() {
            "NULL" => None,
            "INTEGER" | "BOOLEAN" => Some(Value::Int(self.0.try_get_unchecked::<i64, _>(idx)?)),
            "REAL" | "NUMERIC" => Some(Value::Float(self.0.try_get_unchecked::<f64, _>(idx)?)),
            "TEXT" | "DATE" | "TIME" | "DATETIME" => {
                let text = self.0.try_get_unchecked::<String, _>(idx)?;
                Some(parse_text(text))
            }
            other => {
                warn!("Unsupported SQLite storage class: {}", other);
                return Err(DbError::Decode(format!(
                    "column {idx} has unsupported storage class {other}"
                )));
            }
        };
        Ok(value)
    }
}

/// Cells holding JSON documents come back as parsed JSON; anything else
/// stays text.
fn parse_text(text: String) -> Value {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(json) = serde_json::from_str(&text) {
            return Value::Json(json);
        }
    }
    Value::String(text)
}
