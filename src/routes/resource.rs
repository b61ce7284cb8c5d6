//! Resource CRUD routes, mounted by the app under `/api/resources`.

use crate::handlers::resource::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(read).put(update).delete(delete_handler))
        .with_state(state)
}
