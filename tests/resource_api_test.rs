//! HTTP-level tests for the resource API against an in-memory SQLite store.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use resource_api::model::{Page, Resource, ResourceFilter, UpdateResource};
use resource_api::{app, AppError, AppState, ResourceStore, SqliteStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const LIMIT: usize = 1024 * 1024;

/// Helper: fresh in-memory store wrapped in the full router.
async fn setup() -> Router {
    let store = SqliteStore::in_memory().await.unwrap();
    app(AppState::new(Arc::new(store)), LIMIT)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    match body {
        Some(v) => send_raw(router, method, uri, Some("application/json"), Body::from(v.to_string())).await,
        None => send_raw(router, method, uri, None, Body::empty()).await,
    }
}

/// Send a raw body with an optional content type.
async fn send_raw(
    router: &Router,
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: Body,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(router: &Router, body: Value) -> Value {
    let (status, value) = send(router, Method::POST, "/api/resources", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", value);
    value
}

fn names(list: &Value) -> Vec<&str> {
    list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_trims_name_and_omits_missing_description() {
    let router = setup().await;
    let created = create(&router, json!({ "name": "  Widget  " })).await;
    assert_eq!(created["name"], "Widget");
    assert!(created.get("description").is_none());
    assert!(created["id"].as_i64().unwrap() >= 1);

    let uri = format!("/api/resources/{}", created["id"]);
    let (status, fetched) = send(&router, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    assert_eq!(fetched["createdAt"], fetched["updatedAt"]);
}

#[tokio::test]
async fn create_with_blank_name_is_rejected_and_nothing_is_stored() {
    let router = setup().await;
    for body in [json!({ "name": "   " }), json!({ "name": "" }), json!({}), json!({ "name": 3 })] {
        let (status, err) = send(&router, Method::POST, "/api/resources", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"], "Validation error");
        assert_eq!(err["message"], "Name is required and must be a non-empty string");
    }
    let (_, list) = send(&router, Method::GET, "/api/resources", None).await;
    assert_eq!(list["pagination"]["total"], 0);
}

#[tokio::test]
async fn create_rejects_non_string_description_and_malformed_json() {
    let router = setup().await;
    let (status, err) = send(
        &router,
        Method::POST,
        "/api/resources",
        Some(json!({ "name": "a", "description": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Description must be a string");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/resources")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_accepts_form_encoded_body() {
    let router = setup().await;
    let (status, created) = send_raw(
        &router,
        Method::POST,
        "/api/resources",
        Some("application/x-www-form-urlencoded"),
        Body::from("name=%20Gadget%20&description=small+and+round"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["name"], "Gadget");
    assert_eq!(created["description"], "small and round");

    let (status, err) = send_raw(
        &router,
        Method::POST,
        "/api/resources",
        Some("application/x-www-form-urlencoded"),
        Body::from("description=nameless"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Name is required and must be a non-empty string");
}

#[tokio::test]
async fn create_rejects_json_that_is_not_an_object() {
    let router = setup().await;
    let (status, err) = send(&router, Method::POST, "/api/resources", Some(json!(["Widget"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Request body must be a JSON object");
}

#[tokio::test]
async fn read_validates_id_and_reports_missing() {
    let router = setup().await;
    for uri in ["/api/resources/0", "/api/resources/-1", "/api/resources/abc"] {
        let (status, err) = send(&router, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["message"], "Invalid resource ID");
    }
    let (status, err) = send(&router, Method::GET, "/api/resources/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err, json!({ "error": "Not found", "message": "Resource not found" }));
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_filters_by_search_newest_first() {
    let router = setup().await;
    create(&router, json!({ "name": "Widget" })).await;
    create(&router, json!({ "name": "Gizmo", "description": "small" })).await;
    create(&router, json!({ "name": "Gadget", "description": "wide body" })).await;

    let (status, list) = send(&router, Method::GET, "/api/resources?search=wid", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&list), ["Gadget", "Widget"]);
    assert_eq!(
        list["pagination"],
        json!({ "total": 2, "limit": 100, "offset": 0 })
    );
}

#[tokio::test]
async fn list_paginates_and_total_ignores_limit() {
    let router = setup().await;
    for name in ["a", "b", "c", "d"] {
        create(&router, json!({ "name": name })).await;
    }
    let (_, list) = send(&router, Method::GET, "/api/resources?limit=2&offset=1", None).await;
    assert_eq!(names(&list), ["c", "b"]);
    assert_eq!(list["pagination"], json!({ "total": 4, "limit": 2, "offset": 1 }));

    let (_, all) = send(&router, Method::GET, "/api/resources?limit=1000", None).await;
    assert_eq!(
        all["data"].as_array().unwrap().len() as u64,
        all["pagination"]["total"].as_u64().unwrap()
    );
}

#[tokio::test]
async fn list_accepts_offset_beyond_u32() {
    let router = setup().await;
    create(&router, json!({ "name": "Widget" })).await;
    let (status, list) = send(&router, Method::GET, "/api/resources?offset=4294967296", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["data"], json!([]));
    assert_eq!(
        list["pagination"],
        json!({ "total": 1, "limit": 100, "offset": 4294967296u64 })
    );
}

#[tokio::test]
async fn list_rejects_out_of_range_params() {
    let router = setup().await;
    for (uri, message) in [
        ("/api/resources?limit=0", "Limit must be between 1 and 1000"),
        ("/api/resources?limit=1001", "Limit must be between 1 and 1000"),
        ("/api/resources?limit=ten", "Limit must be between 1 and 1000"),
        ("/api/resources?offset=-1", "Offset must be a non-negative number"),
    ] {
        let (status, err) = send(&router, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(err["message"], message);
    }
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_description_only_advances_updated_at() {
    let router = setup().await;
    let created = create(&router, json!({ "name": "Widget" })).await;
    let uri = format!("/api/resources/{}", created["id"]);
    tokio::time::sleep(Duration::from_millis(5)).await;

    let (status, updated) = send(&router, Method::PUT, &uri, Some(json!({ "description": "  blue " }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Widget");
    assert_eq!(updated["description"], "blue");
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert!(updated["updatedAt"].as_str().unwrap() > created["updatedAt"].as_str().unwrap());
}

#[tokio::test]
async fn update_with_empty_body_changes_nothing() {
    let router = setup().await;
    let created = create(&router, json!({ "name": "Widget", "description": "x" })).await;
    let uri = format!("/api/resources/{}", created["id"]);
    tokio::time::sleep(Duration::from_millis(5)).await;

    let (status, same) = send(&router, Method::PUT, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(same, created);
}

#[tokio::test]
async fn update_without_body_changes_nothing() {
    let router = setup().await;
    let created = create(&router, json!({ "name": "Widget" })).await;
    let uri = format!("/api/resources/{}", created["id"]);
    tokio::time::sleep(Duration::from_millis(5)).await;

    let (status, same) = send_raw(&router, Method::PUT, &uri, None, Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(same, created);
}

#[tokio::test]
async fn update_accepts_form_encoded_body() {
    let router = setup().await;
    let created = create(&router, json!({ "name": "Widget" })).await;
    let uri = format!("/api/resources/{}", created["id"]);

    let (status, updated) = send_raw(
        &router,
        Method::PUT,
        &uri,
        Some("application/x-www-form-urlencoded"),
        Body::from("description=blue"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Widget");
    assert_eq!(updated["description"], "blue");
}

#[tokio::test]
async fn update_rejects_unparseable_bodies() {
    let router = setup().await;
    let created = create(&router, json!({ "name": "Widget" })).await;
    let uri = format!("/api/resources/{}", created["id"]);

    for (content_type, body) in [
        (Some("application/json"), "{broken"),
        (Some("application/json"), "\"just a string\""),
        (Some("text/plain"), "name=x"),
        (None, "name=x"),
    ] {
        let (status, err) = send_raw(&router, Method::PUT, &uri, content_type, Body::from(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{:?} {}", content_type, body);
        assert_eq!(err["message"], "Request body must be a JSON object");
    }
}

#[tokio::test]
async fn update_validates_before_checking_existence() {
    let router = setup().await;
    let (status, err) = send(&router, Method::PUT, "/api/resources/5", Some(json!({ "name": " " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Name must be a non-empty string");

    let (status, _) = send(&router, Method::PUT, "/api/resources/5", Some(json!({ "name": "ok" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, Method::PUT, "/api/resources/x", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_twice_is_204_then_404() {
    let router = setup().await;
    let created = create(&router, json!({ "name": "Widget" })).await;
    let uri = format!("/api/resources/{}", created["id"]);

    let (status, body) = send(&router, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&router, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&router, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Common routes and failure paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_ready_and_unknown_route() {
    let router = setup().await;
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "message": "Server is running" }));

    let (status, body) = send(&router, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");

    let (status, body) = send(&router, Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Route not found" }));
}

/// Store whose every call fails, standing in for an unavailable database.
struct UnavailableStore;

#[async_trait]
impl ResourceStore for UnavailableStore {
    async fn insert(&self, _: &str, _: Option<&str>) -> Result<i64, AppError> {
        Err(AppError::Store(sqlx::Error::PoolClosed))
    }
    async fn get_by_id(&self, _: i64) -> Result<Option<Resource>, AppError> {
        Err(AppError::Store(sqlx::Error::PoolClosed))
    }
    async fn query(&self, _: &ResourceFilter, _: Page) -> Result<Vec<Resource>, AppError> {
        Err(AppError::Store(sqlx::Error::PoolClosed))
    }
    async fn count(&self, _: &ResourceFilter) -> Result<u64, AppError> {
        Err(AppError::Store(sqlx::Error::PoolClosed))
    }
    async fn update(&self, _: i64, _: &UpdateResource) -> Result<u64, AppError> {
        Err(AppError::Store(sqlx::Error::PoolClosed))
    }
    async fn delete(&self, _: i64) -> Result<u64, AppError> {
        Err(AppError::Store(sqlx::Error::PoolClosed))
    }
    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::Store(sqlx::Error::PoolClosed))
    }
}

#[tokio::test]
async fn storage_failures_surface_as_generic_500() {
    let router = app(AppState::new(Arc::new(UnavailableStore)), LIMIT);
    let internal = json!({ "error": "Internal server error" });

    let (status, body) = send(&router, Method::POST, "/api/resources", Some(json!({ "name": "a" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, internal);

    for (method, uri) in [
        (Method::GET, "/api/resources"),
        (Method::GET, "/api/resources/1"),
        (Method::DELETE, "/api/resources/1"),
    ] {
        let (status, body) = send(&router, method, uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, internal);
    }

    let (status, body) = send(&router, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");

    // validation still wins over storage
    let (status, _) = send(&router, Method::GET, "/api/resources?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
