//! Resource operations translated into store calls.

use crate::error::AppError;
use crate::model::{CreateResource, Page, Resource, ResourceFilter, UpdateResource};
use crate::store::ResourceStore;

pub struct ResourceService;

impl ResourceService {
    /// Insert and return the record as read back from the store. Input is assumed validated.
    pub async fn create(store: &dyn ResourceStore, input: &CreateResource) -> Result<Resource, AppError> {
        let description = input.description.as_deref().filter(|d| !d.is_empty());
        let id = store.insert(&input.name, description).await?;
        store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::RowShape(format!("inserted row {} not readable", id)))
    }

    /// List matching rows, newest first. Limit defaults to 100, offset to 0.
    pub async fn find_all(
        store: &dyn ResourceStore,
        filter: &ResourceFilter,
        limit: Option<u32>,
        offset: Option<i64>,
    ) -> Result<Vec<Resource>, AppError> {
        store.query(filter, Page::new(limit, offset)).await
    }

    pub async fn find_by_id(store: &dyn ResourceStore, id: i64) -> Result<Option<Resource>, AppError> {
        store.get_by_id(id).await
    }

    /// Apply the present fields. An empty change set returns the current record untouched.
    pub async fn update(
        store: &dyn ResourceStore,
        id: i64,
        changes: &UpdateResource,
    ) -> Result<Option<Resource>, AppError> {
        if changes.is_empty() {
            return store.get_by_id(id).await;
        }
        if store.update(id, changes).await? == 0 {
            return Ok(None);
        }
        store.get_by_id(id).await
    }

    /// True when a row was removed.
    pub async fn delete(store: &dyn ResourceStore, id: i64) -> Result<bool, AppError> {
        Ok(store.delete(id).await? > 0)
    }

    /// Total rows matching the filter, ignoring pagination.
    pub async fn count(store: &dyn ResourceStore, filter: &ResourceFilter) -> Result<u64, AppError> {
        store.count(filter).await
    }
}
