//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    InvalidVar { var: &'static str, value: String },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Input rejected before reaching the service. The message is returned to the client.
    #[error("{0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database: {0}")]
    Store(#[from] sqlx::Error),
    /// A row came back from the store without the shape a `Resource` needs.
    #[error("malformed row: {0}")]
    RowShape(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) | AppError::Store(_) | AppError::RowShape(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation(message) => ErrorBody {
                error: "Validation error".into(),
                message: Some(message.clone()),
            },
            AppError::NotFound(what) => ErrorBody {
                error: "Not found".into(),
                message: Some(format!("{} not found", what)),
            },
            _ => {
                // storage details stay in the log
                tracing::error!(error = %self, "request failed");
                ErrorBody {
                    error: "Internal server error".into(),
                    message: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("Resource".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Store(sqlx::Error::PoolClosed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::RowShape("name".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_body_hides_cause() {
        let body = ErrorBody {
            error: "Internal server error".into(),
            message: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "error": "Internal server error" })
        );
    }
}
