//! Resource record and the typed inputs accepted by the service.

use serde::Serialize;

pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

/// A persisted resource as returned to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Validated, trimmed create payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateResource {
    pub name: String,
    pub description: Option<String>,
}

/// Validated, trimmed update payload. Only fields that were present in the request are `Some`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateResource {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateResource {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Substring filter shared by list and count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    pub search: Option<String>,
}

impl ResourceFilter {
    /// An empty search term means no filter.
    pub fn search(term: Option<String>) -> Self {
        Self {
            search: term.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    /// Non-negative; kept as `i64` because SQLite binds it that way.
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: Option<u32>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}
