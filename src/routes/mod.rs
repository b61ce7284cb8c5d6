//! Router assembly: common routes, resource routes, JSON fallbacks for unmatched paths and panics.

mod common;
mod resource;

pub use common::common_routes;
pub use resource::resource_routes;

use crate::error::ErrorBody;
use crate::state::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

pub const RESOURCES_PATH: &str = "/api/resources";

async fn route_not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Route not found".into(),
            message: None,
        }),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Internal server error".into(),
            message: None,
        }),
    )
        .into_response()
}

/// Full application router. `body_limit` caps request bodies in bytes.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest(RESOURCES_PATH, resource_routes(state))
        .fallback(route_not_found)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}
