//! Resource CRUD handlers: validate, call the service, map the outcome to a status and body.

use crate::error::AppError;
use crate::extractors::ResourceBody;
use crate::model::DEFAULT_LIMIT;
use crate::response::{ListBody, Pagination};
use crate::service::{RequestValidator, ResourceService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;

const RESOURCE: &str = "Resource";

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let q = RequestValidator::list(&params)?;
    let store = state.store.as_ref();
    let data = ResourceService::find_all(store, &q.filter, q.limit, q.offset).await?;
    let total = ResourceService::count(store, &q.filter).await?;
    Ok(Json(ListBody {
        data,
        pagination: Pagination {
            total,
            limit: q.limit.unwrap_or(DEFAULT_LIMIT),
            offset: q.offset.unwrap_or(0),
        },
    }))
}

pub async fn create(
    State(state): State<AppState>,
    ResourceBody(body): ResourceBody,
) -> Result<impl IntoResponse, AppError> {
    let input = RequestValidator::create(&body)?;
    let resource = ResourceService::create(state.store.as_ref(), &input).await?;
    tracing::info!(id = resource.id, "resource created");
    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = RequestValidator::id(&id_str)?;
    let resource = ResourceService::find_by_id(state.store.as_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(RESOURCE.into()))?;
    Ok(Json(resource))
}

/// Existence is checked before the body's fields are applied.
pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    ResourceBody(body): ResourceBody,
) -> Result<impl IntoResponse, AppError> {
    let id = RequestValidator::id(&id_str)?;
    let changes = RequestValidator::update(&body)?;
    let store = state.store.as_ref();
    if ResourceService::find_by_id(store, id).await?.is_none() {
        return Err(AppError::NotFound(RESOURCE.into()));
    }
    let resource = ResourceService::update(store, id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound(RESOURCE.into()))?;
    Ok(Json(resource))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = RequestValidator::id(&id_str)?;
    if !ResourceService::delete(state.store.as_ref(), id).await? {
        return Err(AppError::NotFound(RESOURCE.into()));
    }
    tracing::info!(id, "resource deleted");
    Ok(StatusCode::NO_CONTENT)
}
