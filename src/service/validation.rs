//! Request validation for resource payloads, path ids and list queries.
//! Runs before any service call; every failure is a 400.

use crate::error::AppError;
use crate::model::{CreateResource, ResourceFilter, UpdateResource, MAX_LIMIT};
use serde_json::{Map, Value};
use std::collections::HashMap;

const MSG_NAME_REQUIRED: &str = "Name is required and must be a non-empty string";
const MSG_NAME_NON_EMPTY: &str = "Name must be a non-empty string";
const MSG_DESCRIPTION: &str = "Description must be a string";
const MSG_LIMIT: &str = "Limit must be between 1 and 1000";
const MSG_OFFSET: &str = "Offset must be a non-negative number";
const MSG_ID: &str = "Invalid resource ID";
const MSG_BODY: &str = "Request body must be a JSON object";

/// Validated list parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: Option<i64>,
    pub filter: ResourceFilter,
}

pub struct RequestValidator;

impl RequestValidator {
    /// Error for a body that is missing, not JSON, or not a JSON object.
    pub fn malformed_body() -> AppError {
        AppError::validation(MSG_BODY)
    }

    /// Path id: an integer >= 1.
    pub fn id(raw: &str) -> Result<i64, AppError> {
        match raw.trim().parse::<i64>() {
            Ok(id) if id >= 1 => Ok(id),
            _ => Err(AppError::validation(MSG_ID)),
        }
    }

    /// Create body: `name` required non-blank string, `description` optional string. Both trimmed.
    pub fn create(body: &Value) -> Result<CreateResource, AppError> {
        let obj = as_object(body)?;
        let name = match obj.get("name") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return Err(AppError::validation(MSG_NAME_REQUIRED)),
        };
        let description = match obj.get("description") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(_) => return Err(AppError::validation(MSG_DESCRIPTION)),
        };
        Ok(CreateResource { name, description })
    }

    /// Update body: only keys present are validated and forwarded. `null` counts as present.
    pub fn update(body: &Value) -> Result<UpdateResource, AppError> {
        let obj = as_object(body)?;
        let name = match obj.get("name") {
            None => None,
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(_) => return Err(AppError::validation(MSG_NAME_NON_EMPTY)),
        };
        let description = match obj.get("description") {
            None => None,
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(_) => return Err(AppError::validation(MSG_DESCRIPTION)),
        };
        Ok(UpdateResource { name, description })
    }

    /// `limit` in [1, 1000], `offset` >= 0, `search` passed through. Empty values count as absent.
    pub fn list(params: &HashMap<String, String>) -> Result<ListQuery, AppError> {
        let get = |key: &str| params.get(key).map(|v| v.as_str()).filter(|v| !v.is_empty());

        let limit = get("limit")
            .map(|raw| match raw.trim().parse::<i64>() {
                Ok(n) if (1..=i64::from(MAX_LIMIT)).contains(&n) => Ok(n as u32),
                _ => Err(AppError::validation(MSG_LIMIT)),
            })
            .transpose()?;
        let offset = get("offset")
            .map(|raw| match raw.trim().parse::<i64>() {
                Ok(n) if n >= 0 => Ok(n),
                _ => Err(AppError::validation(MSG_OFFSET)),
            })
            .transpose()?;
        let filter = ResourceFilter::search(get("search").map(str::to_string));
        Ok(ListQuery {
            limit,
            offset,
            filter,
        })
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, AppError> {
    body.as_object().ok_or_else(RequestValidator::malformed_body)
}
