//! Column metadata as supplied by the field metadata provider.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod provider;

/// The kind of a field as the user configured it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    SingleLineText,
    LongText,
    Number,
    Rating,
    AutoNumber,
    Checkbox,
    Date,
    CreatedTime,
    LastModifiedTime,
    SingleSelect,
    MultipleSelect,
    Link,
    User,
    Attachment,
    Formula,
    Rollup,
}

impl FieldType {
    pub const ALL: [FieldType; 16] = [
        FieldType::SingleLineText,
        FieldType::LongText,
        FieldType::Number,
        FieldType::Rating,
        FieldType::AutoNumber,
        FieldType::Checkbox,
        FieldType::Date,
        FieldType::CreatedTime,
        FieldType::LastModifiedTime,
        FieldType::SingleSelect,
        FieldType::MultipleSelect,
        FieldType::Link,
        FieldType::User,
        FieldType::Attachment,
        FieldType::Formula,
        FieldType::Rollup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::SingleLineText => "singleLineText",
            FieldType::LongText => "longText",
            FieldType::Number => "number",
            FieldType::Rating => "rating",
            FieldType::AutoNumber => "autoNumber",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
            FieldType::CreatedTime => "createdTime",
            FieldType::LastModifiedTime => "lastModifiedTime",
            FieldType::SingleSelect => "singleSelect",
            FieldType::MultipleSelect => "multipleSelect",
            FieldType::Link => "link",
            FieldType::User => "user",
            FieldType::Attachment => "attachment",
            FieldType::Formula => "formula",
            FieldType::Rollup => "rollup",
        }
    }

    /// The cell value type a field of this kind stores unless it is
    /// computed (formula, rollup), in which case it is declared per field.
    pub fn default_cell_value_type(&self) -> CellValueType {
        match self {
            FieldType::Number | FieldType::Rating | FieldType::AutoNumber => CellValueType::Number,
            FieldType::Checkbox => CellValueType::Boolean,
            FieldType::Date | FieldType::CreatedTime | FieldType::LastModifiedTime => {
                CellValueType::DateTime
            }
            _ => CellValueType::String,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown field type: {s}"))
    }
}

/// The primitive type of the value stored in a cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CellValueType {
    String,
    Number,
    Boolean,
    DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Storage column name in the record table.
    pub db_field_name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub cell_value_type: CellValueType,
    /// Whether the cell holds a JSON array of values rather than one value.
    #[serde(default)]
    pub is_multiple_cell_value: bool,
}

impl FieldDescriptor {
    pub fn new(id: &str, db_field_name: &str, field_type: FieldType) -> Self {
        Self {
            id: id.to_string(),
            name: db_field_name.to_string(),
            db_field_name: db_field_name.to_string(),
            field_type,
            cell_value_type: field_type.default_cell_value_type(),
            is_multiple_cell_value: matches!(field_type, FieldType::MultipleSelect),
        }
    }

    pub fn with_cell_value_type(mut self, cell_value_type: CellValueType) -> Self {
        self.cell_value_type = cell_value_type;
        self
    }

    pub fn multiple(mut self, is_multiple_cell_value: bool) -> Self {
        self.is_multiple_cell_value = is_multiple_cell_value;
        self
    }

    /// Link, user and attachment cells hold JSON objects rather than scalars.
    pub fn is_json_object(&self) -> bool {
        matches!(
            self.field_type,
            FieldType::Link | FieldType::User | FieldType::Attachment
        )
    }

    /// Whether each cell holds a JSON array. Multiple-select and attachment
    /// cells always do, whatever the provider's flag says.
    pub fn is_multiple(&self) -> bool {
        self.is_multiple_cell_value
            || matches!(
                self.field_type,
                FieldType::MultipleSelect | FieldType::Attachment
            )
    }

    /// Whether the column stores a JSON document that filters must look into.
    pub fn is_json_valued(&self) -> bool {
        self.is_multiple() || self.is_json_object()
    }
}
