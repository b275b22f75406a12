use cell_filter::FilterError;
use connectors::sql::base::error::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON input: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported dialect: {0} (expected sqlite or postgres)")]
    InvalidDialect(String),

    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    #[error("Queries can only run against SQLite, not {0}")]
    UnsupportedQueryDialect(String),
}
