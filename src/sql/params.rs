//! Values bound to SQLite statements.

use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// A value that can be bound to a SQLite query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SqlParam {
    Null,
    Int(i64),
    Text(String),
}

impl From<i64> for SqlParam {
    fn from(n: i64) -> Self {
        SqlParam::Int(n)
    }
}

impl From<&str> for SqlParam {
    fn from(s: &str) -> Self {
        SqlParam::Text(s.to_string())
    }
}

impl From<Option<&str>> for SqlParam {
    fn from(s: Option<&str>) -> Self {
        s.map(SqlParam::from).unwrap_or(SqlParam::Null)
    }
}

/// Bind every param in order.
pub fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for p in params {
        query = match p {
            SqlParam::Null => query.bind(None::<&str>),
            SqlParam::Int(n) => query.bind(*n),
            SqlParam::Text(s) => query.bind(s.as_str()),
        };
    }
    query
}
