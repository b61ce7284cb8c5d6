//! Persistence for resources: the `ResourceStore` seam and its SQLite implementation.

use crate::error::AppError;
use crate::model::{Page, Resource, ResourceFilter, UpdateResource};
use crate::sql::{self, bind_all, QueryBuf};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::PathBuf;
use std::str::FromStr;

/// Durable table of resources with an auto-incrementing id. Each call is a single atomic statement.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Insert a row; both timestamps are set to the store's clock. Returns the new id.
    async fn insert(&self, name: &str, description: Option<&str>) -> Result<i64, AppError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Resource>, AppError>;

    /// Rows matching `filter`, newest `created_at` first.
    async fn query(&self, filter: &ResourceFilter, page: Page) -> Result<Vec<Resource>, AppError>;

    async fn count(&self, filter: &ResourceFilter) -> Result<u64, AppError>;

    /// Set the provided fields and refresh `updated_at`. Returns the affected row count.
    async fn update(&self, id: i64, changes: &UpdateResource) -> Result<u64, AppError>;

    /// Returns the affected row count.
    async fn delete(&self, id: i64) -> Result<u64, AppError>;

    /// Cheap round-trip used by readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Timestamp in the stored textual form: RFC 3339, UTC, microseconds. Lexical order is chronological.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.6fZ")
        .to_string()
}

// Column defaults pad SQLite's millisecond `%f` to the microsecond shape of `now_timestamp`.
const SCHEMA_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS resources (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%f', 'now') || '000Z'),
        updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%f', 'now') || '000Z')
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_resources_name ON resources(name)",
    "CREATE INDEX IF NOT EXISTS idx_resources_created_at ON resources(created_at)",
];

/// Create the directory holding a file-backed SQLite database if it does not exist.
/// In-memory URLs are left alone. Call before opening the pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let Some(file) = database_file(database_url) else {
        return Ok(());
    };
    if let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::Config(e.into()))?;
    }
    Ok(())
}

/// File path named by a `sqlite:` URL, or `None` for in-memory databases.
fn database_file(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = rest.split('?').next().unwrap_or("").trim();
    if path.is_empty() || path == ":memory:" || path.starts_with("file:") {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Create the resources table and its indices. Idempotent.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), AppError> {
    for ddl in SCHEMA_DDL {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::info!("resources schema ready");
    Ok(())
}

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool on `database_url`, creating the file if missing, and ensure the schema.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        ensure_database_exists(database_url).await?;
        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;
        ensure_schema(&pool).await?;
        tracing::info!(url = %database_url, "connected to sqlite");
        Ok(Self::new(pool))
    }

    /// Private in-memory database. One connection that is never recycled, so the data lives as long as the store.
    pub async fn in_memory() -> Result<Self, AppError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;
        ensure_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool; waits for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("sqlite pool closed");
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<SqliteRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<SqliteRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn execute(&self, q: &QueryBuf) -> Result<sqlx::sqlite::SqliteQueryResult, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let result = bind_all(sqlx::query(&q.sql), &q.params)
            .execute(&self.pool)
            .await?;
        Ok(result)
    }
}

#[async_trait]
impl ResourceStore for SqliteStore {
    async fn insert(&self, name: &str, description: Option<&str>) -> Result<i64, AppError> {
        let q = sql::insert(name, description, &now_timestamp());
        Ok(self.execute(&q).await?.last_insert_rowid())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Resource>, AppError> {
        self.fetch_optional(&sql::select_by_id(id))
            .await?
            .map(|row| resource_from_row(&row))
            .transpose()
    }

    async fn query(&self, filter: &ResourceFilter, page: Page) -> Result<Vec<Resource>, AppError> {
        self.fetch_all(&sql::select_list(filter, page))
            .await?
            .iter()
            .map(resource_from_row)
            .collect()
    }

    async fn count(&self, filter: &ResourceFilter) -> Result<u64, AppError> {
        let row = self
            .fetch_optional(&sql::count(filter))
            .await?
            .ok_or_else(|| AppError::RowShape("COUNT(*) returned no row".into()))?;
        let n: i64 = row.try_get(0)?;
        Ok(n.max(0) as u64)
    }

    async fn update(&self, id: i64, changes: &UpdateResource) -> Result<u64, AppError> {
        match sql::update(id, changes, &now_timestamp()) {
            Some(q) => Ok(self.execute(&q).await?.rows_affected()),
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> Result<u64, AppError> {
        Ok(self.execute(&sql::delete(id)).await?.rows_affected())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

/// Map a raw `resources` row into a [`Resource`]. Absent or mistyped required columns are an error.
/// An empty description reads back as absent.
pub fn resource_from_row(row: &SqliteRow) -> Result<Resource, AppError> {
    let shape = |col: &str, e: sqlx::Error| AppError::RowShape(format!("{}: {}", col, e));
    let id: i64 = row.try_get("id").map_err(|e| shape("id", e))?;
    let name: String = row.try_get("name").map_err(|e| shape("name", e))?;
    let description: Option<String> = row
        .try_get("description")
        .map_err(|e| shape("description", e))?;
    let created_at: String = row.try_get("created_at").map_err(|e| shape("created_at", e))?;
    let updated_at: String = row.try_get("updated_at").map_err(|e| shape("updated_at", e))?;
    Ok(Resource {
        id,
        name,
        description: description.filter(|d| !d.is_empty()),
        created_at,
        updated_at,
    })
}
