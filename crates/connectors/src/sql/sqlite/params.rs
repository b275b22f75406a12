use chrono::{DateTime, Utc};
use model::core::value::Value;
use sqlx::{Database, Sqlite, query::Query};

/// Text form of bound timestamps. Fixed-width so that stored values compare
/// correctly as strings.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub type SqliteQuery<'q> = Query<'q, Sqlite, <Sqlite as Database>::Arguments<'q>>;

pub fn timestamp_text(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Binds `params` in order. SQLite has no native timestamp or JSON type, so
/// both are bound as text.
pub fn bind_values<'q>(mut query: SqliteQuery<'q>, params: &'q [Value]) -> SqliteQuery<'q> {
    for p in params {
        query = match p {
            Value::Int(i) => query.bind(*i),
            Value::Float(f) => query.bind(*f),
            Value::String(s) => query.bind(s.as_str()),
            Value::Boolean(b) => query.bind(*b),
            Value::Json(j) => query.bind(j.to_string()),
            Value::Timestamp(t) => query.bind(timestamp_text(t)),
            Value::Null => query.bind(None::<String>),
        };
    }
    query
}
