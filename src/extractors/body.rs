//! Request body as a JSON object, whether sent as JSON or as a urlencoded form.

use crate::error::AppError;
use crate::service::RequestValidator;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Body fields handed to the validator. A request without a body yields an empty object.
/// Form fields arrive as strings; JSON bodies must be objects.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceBody(pub Value);

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(content_type: Option<&str>) -> BodyKind {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|m| m.trim().to_ascii_lowercase());
    match mime.as_deref() {
        Some("application/x-www-form-urlencoded") => BodyKind::Form,
        Some("application/json") => BodyKind::Json,
        Some(m) if m.starts_with("application/") && m.ends_with("+json") => BodyKind::Json,
        _ => BodyKind::Other,
    }
}

#[async_trait]
impl<S> FromRequest<S> for ResourceBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let kind = body_kind(content_type.as_deref());

        if kind == BodyKind::Form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|rejection| {
                    tracing::debug!(%rejection, "rejected form body");
                    RequestValidator::malformed_body()
                })?;
            let obj: Map<String, Value> = fields.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
            return Ok(ResourceBody(Value::Object(obj)));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(%rejection, "unreadable request body");
            RequestValidator::malformed_body()
        })?;
        if bytes.is_empty() {
            return Ok(ResourceBody(Value::Object(Map::new())));
        }
        if kind != BodyKind::Json {
            tracing::debug!(content_type = ?content_type, "unsupported body content type");
            return Err(RequestValidator::malformed_body());
        }
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!(error = %e, "malformed json body");
            RequestValidator::malformed_body()
        })?;
        Ok(ResourceBody(value))
    }
}
