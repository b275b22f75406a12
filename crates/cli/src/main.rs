use crate::{
    commands::{Commands, DialectKind},
    config::{AppConfig, EnvManager},
    error::CliError,
    output::{CompiledQuery, OperatorSupport},
};
use cell_filter::{CellValueFilter, FilterTranslator};
use clap::Parser;
use connectors::sql::{base::source::RecordSource, sqlite::adapter::SqliteAdapter};
use model::{
    field::{FieldDescriptor, FieldType, provider::FieldRegistry},
    filter::{FilterNode, FilterSet},
};
use planner::query::context::QueryContext;
use std::str::FromStr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "gridql",
    version = "0.1.0",
    about = "Compile spreadsheet cell filters into SQL"
)]
struct Cli {
    #[arg(long, global = true, help = "Load settings from this .env file")]
    env_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let mut env = EnvManager::new();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }
    let config = AppConfig::from_env(&env)?;

    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compile {
            fields,
            filter,
            table,
            alias,
            dialect,
        } => {
            let dialect = dialect.unwrap_or(config.dialect);
            let compiler = filter_compiler(dialect, &config);
            let ctx = build_query(&compiler, &fields, &filter, &table, alias.as_deref())?;

            let (sql, params) = ctx.render(compiler.dialect().sql_dialect());
            info!("Compiled filter for {} into {} params", table, params.len());
            output::print_json(&CompiledQuery::new(compiler.dialect().name(), sql, &params))?;
        }
        Commands::Query {
            fields,
            filter,
            table,
            alias,
            database_url,
            setup,
            limit,
        } => {
            if config.dialect != DialectKind::Sqlite {
                warn!("Query requested with {:?} dialect", config.dialect);
                return Err(CliError::UnsupportedQueryDialect(format!("{:?}", config.dialect)));
            }
            let compiler = filter_compiler(DialectKind::Sqlite, &config);
            let mut ctx = build_query(&compiler, &fields, &filter, &table, alias.as_deref())?;
            if let Some(limit) = limit {
                ctx.limit(limit);
            }

            let url = database_url.unwrap_or(config.database_url);
            let adapter = SqliteAdapter::connect(&url).await?;
            if let Some(path) = setup {
                let script = tokio::fs::read_to_string(&path).await?;
                adapter.execute(&script).await?;
            }

            let rows = adapter.fetch_rows(&ctx).await?;
            info!("Fetched {} rows from {}", rows.len(), table);
            output::print_rows(&rows)?;
        }
        Commands::Operators {
            field_type,
            multiple,
        } => {
            let field_types = match field_type {
                Some(name) => {
                    vec![FieldType::from_str(&name).map_err(|_| CliError::UnknownFieldType(name))?]
                }
                None => FieldType::ALL.to_vec(),
            };

            let support: Vec<OperatorSupport> = field_types
                .into_iter()
                .map(|field_type| {
                    let field = FieldDescriptor::new("field", "field", field_type);
                    let field = if multiple { field.multiple(true) } else { field };
                    OperatorSupport::for_field(&field)
                })
                .collect();
            output::print_json(&support)?;
        }
    }

    Ok(())
}

fn filter_compiler(dialect: DialectKind, config: &AppConfig) -> CellValueFilter {
    let filter = match dialect {
        DialectKind::Sqlite => CellValueFilter::sqlite(),
        DialectKind::Postgres => CellValueFilter::postgres(),
    };
    filter.with_time_zone(config.time_zone)
}

/// Resolves the field metadata and filter arguments and attaches the
/// compiled filter to a `SELECT *` on `table`.
fn build_query(
    compiler: &CellValueFilter,
    fields: &str,
    filter: &str,
    table: &str,
    alias: Option<&str>,
) -> Result<QueryContext, CliError> {
    let registry = FieldRegistry::from_json(&read_json_arg(fields)?)?;
    let tree = match serde_json::from_str::<FilterNode>(&read_json_arg(filter)?)? {
        FilterNode::Set(set) => set,
        FilterNode::Item(item) => FilterSet::and(vec![item.into()]),
    };

    let mut ctx = QueryContext::new(table);
    if let Some(alias) = alias {
        ctx = ctx.with_alias(alias);
    }

    FilterTranslator::new(compiler, &registry).translate(&mut ctx, &tree)?;
    Ok(ctx)
}

/// Arguments holding JSON accept either the document itself or a path to it.
fn read_json_arg(arg: &str) -> Result<String, CliError> {
    let trimmed = arg.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        Ok(arg.to_string())
    } else {
        Ok(std::fs::read_to_string(arg)?)
    }
}
