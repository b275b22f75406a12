use crate::{commands::DialectKind, error::CliError};
use chrono_tz::Tz;
use std::{collections::HashMap, fs, path::Path};

pub const LOG_LEVEL_VAR: &str = "GRIDQL_LOG_LEVEL";
pub const DIALECT_VAR: &str = "GRIDQL_DIALECT";
pub const DATABASE_URL_VAR: &str = "GRIDQL_DATABASE_URL";
pub const TIME_ZONE_VAR: &str = "GRIDQL_TIME_ZONE";

/// Environment variable manager that loads from system and .env files
#[derive(Debug, Clone)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Load variables from a .env file. File entries override the process
    /// environment.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        self.parse_env_content(&content)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars.insert(key.to_string(), Self::unquote_value(value));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }
        value.to_string()
    }
}

impl Default for EnvManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings shared by every command. Command-line flags take precedence.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// A `tracing` filter directive, e.g. `info` or `cell_filter=debug`.
    pub log_level: String,
    pub dialect: DialectKind,
    pub database_url: String,
    /// Zone date filters interpret calendar days in.
    pub time_zone: Tz,
}

impl AppConfig {
    pub fn from_env(env: &EnvManager) -> Result<Self, CliError> {
        let dialect = DialectKind::parse(env.get_or(DIALECT_VAR, "sqlite"))?;

        let tz_name = env.get_or(TIME_ZONE_VAR, "UTC");
        let time_zone = tz_name
            .parse::<Tz>()
            .map_err(|e| CliError::Config(format!("{TIME_ZONE_VAR}: {tz_name}: {e}")))?;

        Ok(Self {
            log_level: env.get_or(LOG_LEVEL_VAR, "info").to_string(),
            dialect,
            database_url: env.get_or(DATABASE_URL_VAR, "sqlite::memory:").to_string(),
            time_zone,
        })
    }
}
