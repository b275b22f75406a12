use crate::error::CliError;
use clap::{Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectKind {
    Sqlite,
    Postgres,
}

impl DialectKind {
    pub fn parse(name: &str) -> Result<Self, CliError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(DialectKind::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            _ => Err(CliError::InvalidDialect(name.to_string())),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a filter into a parameterized SELECT statement
    Compile {
        #[arg(long, help = "Field metadata: a JSON file path or an inline JSON array")]
        fields: String,

        #[arg(
            long,
            help = "Filter tree or single filter item: a JSON file path or inline JSON"
        )]
        filter: String,

        #[arg(long, help = "Record table to select from")]
        table: String,

        #[arg(long, help = "Alias used to qualify columns")]
        alias: Option<String>,

        #[arg(long, value_enum, help = "Target dialect, overrides GRIDQL_DIALECT")]
        dialect: Option<DialectKind>,
    },
    /// Run a filter against a SQLite database and print the matching rows
    Query {
        #[arg(long, help = "Field metadata: a JSON file path or an inline JSON array")]
        fields: String,

        #[arg(
            long,
            help = "Filter tree or single filter item: a JSON file path or inline JSON"
        )]
        filter: String,

        #[arg(long, help = "Record table to select from")]
        table: String,

        #[arg(long, help = "Alias used to qualify columns")]
        alias: Option<String>,

        #[arg(long, help = "SQLite URL, overrides GRIDQL_DATABASE_URL")]
        database_url: Option<String>,

        #[arg(long, help = "SQL script to run before the query, e.g. a schema and fixtures")]
        setup: Option<String>,

        #[arg(long, help = "Maximum number of rows to return")]
        limit: Option<i64>,
    },
    /// List the operators each kind of field supports
    Operators {
        #[arg(long, help = "Only show this field type, e.g. link or singleSelect")]
        field_type: Option<String>,

        #[arg(long, help = "Treat the field as holding multiple values per cell")]
        multiple: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::DialectKind;

    #[test]
    fn test_parse_dialect_names() {
        assert_eq!(DialectKind::parse("SQLite").unwrap(), DialectKind::Sqlite);
        assert_eq!(DialectKind::parse("pg").unwrap(), DialectKind::Postgres);
        assert!(DialectKind::parse("mysql").is_err());
    }
}
