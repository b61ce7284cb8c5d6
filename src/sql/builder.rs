//! Builds the parameterized statements run against the `resources` table.

use crate::model::{Page, ResourceFilter, UpdateResource};
use crate::sql::SqlParam;

const TABLE: &str = "resources";
const COLUMNS: &str = "id, name, description, created_at, updated_at";

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: impl Into<SqlParam>) {
        self.params.push(v.into());
    }
}

/// Escape LIKE metacharacters so the term matches literally, then wrap it in `%`.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn push_filter(q: &mut QueryBuf, filter: &ResourceFilter) {
    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        q.sql.push_str(" WHERE name LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\'");
        q.push_param(pattern.as_str());
        q.push_param(pattern.as_str());
    }
}

pub fn insert(name: &str, description: Option<&str>, now: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "INSERT INTO {} (name, description, created_at, updated_at) VALUES (?, ?, ?, ?)",
        TABLE
    );
    q.push_param(name);
    q.push_param(description);
    q.push_param(now);
    q.push_param(now);
    q
}

pub fn select_by_id(id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT {} FROM {} WHERE id = ?", COLUMNS, TABLE);
    q.push_param(id);
    q
}

/// Newest first; equal `created_at` values fall back to insertion order, newest first.
pub fn select_list(filter: &ResourceFilter, page: Page) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT {} FROM {}", COLUMNS, TABLE);
    push_filter(&mut q, filter);
    q.sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
    q.push_param(i64::from(page.limit));
    q.push_param(page.offset);
    q
}

pub fn count(filter: &ResourceFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COUNT(*) FROM {}", TABLE);
    push_filter(&mut q, filter);
    q
}

/// UPDATE of the provided fields plus `updated_at`. Returns `None` when there is nothing to set.
pub fn update(id: i64, changes: &UpdateResource, now: &str) -> Option<QueryBuf> {
    if changes.is_empty() {
        return None;
    }
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    if let Some(name) = &changes.name {
        sets.push("name = ?");
        q.push_param(name.as_str());
    }
    if let Some(description) = &changes.description {
        sets.push("description = ?");
        // empty description clears the column
        q.push_param(Some(description.as_str()).filter(|d| !d.is_empty()));
    }
    sets.push("updated_at = ?");
    q.push_param(now);
    q.push_param(id);
    q.sql = format!("UPDATE {} SET {} WHERE id = ?", TABLE, sets.join(", "));
    Some(q)
}

pub fn delete(id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("DELETE FROM {} WHERE id = ?", TABLE);
    q.push_param(id);
    q
}
