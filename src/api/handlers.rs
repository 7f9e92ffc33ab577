//! API request handlers

use axum::{
    extract::{Path, Query},
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use utoipa::{IntoParams, ToSchema};

use super::extract::ValidJson;
use super::routes::ROUTE_PATHS;
use crate::types::Item;
use crate::validation::{parse_int_param, ValidationError};

/// Greeting returned by the root endpoint
pub const GREETING: &str = "Just redeployed :O";

// Query parameters

#[derive(Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReadItemParams {
    /// Optional free-text query echoed back
    pub q: Option<String>,
}

impl ReadItemParams {
    /// Collapse raw query pairs; a repeated key keeps its last value.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let q = pairs
            .into_iter()
            .filter(|(key, _)| key == "q")
            .map(|(_, value)| value)
            .last();
        Self { q }
    }
}

// Response types

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Greeting text
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemLookupResponse {
    /// Requested item identifier
    pub item_id: i64,
    /// Query text, null when not supplied
    pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemResponse {
    /// The validated item, echoed back
    pub item: Item,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub detail: String,
}

// Handlers

/// Root greeting
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Greeting", body = MessageResponse)
    ),
    tag = "meta"
)]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: GREETING.into(),
    })
}

/// Look up an item by ID
#[utoipa::path(
    get,
    path = "/items/{item_id}",
    params(
        ("item_id" = i64, Path, description = "Integer item identifier"),
        ReadItemParams
    ),
    responses(
        (status = 200, description = "Item identifier and query", body = ItemLookupResponse),
        (status = 422, description = "item_id is not an integer", body = ValidationError)
    ),
    tag = "items"
)]
pub async fn read_item(
    Path(item_id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ItemLookupResponse>, ValidationError> {
    let item_id = parse_int_param("item_id", &item_id)?;
    let params = ReadItemParams::from_pairs(pairs);

    Ok(Json(ItemLookupResponse {
        item_id,
        q: params.q,
    }))
}

/// Validate an item and echo it back
#[utoipa::path(
    post,
    path = "/items/",
    request_body = Item,
    responses(
        (status = 200, description = "Validated item", body = ItemResponse),
        (status = 422, description = "Body failed validation", body = ValidationError)
    ),
    tag = "items"
)]
pub async fn create_item(ValidJson(item): ValidJson<Item>) -> Json<ItemResponse> {
    tracing::debug!("Validated item {:?}", item.name);
    Json(ItemResponse { item })
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
    })
}

/// Unmatched paths redirect to their trailing-slash twin when that one is
/// routed, otherwise 404.
pub async fn not_found(uri: Uri) -> Response {
    if let Some(path) = slash_redirect_target(uri.path()) {
        let target = match uri.query() {
            Some(query) => format!("{}?{}", path, query),
            None => path,
        };
        tracing::debug!(from = %uri, to = %target, "Redirecting trailing slash");
        return Redirect::temporary(&target).into_response();
    }

    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            detail: "Not Found".into(),
        }),
    )
        .into_response()
}

pub async fn method_not_allowed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            detail: "Method Not Allowed".into(),
        }),
    )
}

/// `path` with its trailing slash added or removed, if a route serves that form.
fn slash_redirect_target(path: &str) -> Option<String> {
    let toggled = if path.ends_with('/') {
        path.trim_end_matches('/').to_string()
    } else {
        format!("{}/", path)
    };
    if toggled.is_empty() {
        return None;
    }

    ROUTE_PATHS
        .iter()
        .any(|pattern| path_matches(pattern, &toggled))
        .then_some(toggled)
}

/// Segment-wise match where `{name}` stands for any non-empty segment.
fn path_matches(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(expected), Some(actual)) => {
                let is_param = expected.starts_with('{') && expected.ends_with('}');
                if is_param && actual.is_empty() {
                    return false;
                }
                if !is_param && expected != actual {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_last_q_wins() {
        let params = ReadItemParams::from_pairs(vec![
            pair("q", "first"),
            pair("other", "x"),
            pair("q", "second"),
        ]);
        assert_eq!(params.q.as_deref(), Some("second"));
    }

    #[test]
    fn test_q_absent() {
        let params = ReadItemParams::from_pairs(vec![pair("other", "x")]);
        assert!(params.q.is_none());
    }

    #[test]
    fn test_path_matches() {
        assert!(path_matches("/items/{item_id}", "/items/5"));
        assert!(path_matches("/items/", "/items/"));
        assert!(!path_matches("/items/", "/items"));
        assert!(!path_matches("/items/{item_id}", "/items/"));
        assert!(!path_matches("/items/{item_id}", "/items/5/extra"));
        assert!(!path_matches("/health", "/healthz"));
    }

    #[test]
    fn test_slash_redirect_target() {
        assert_eq!(slash_redirect_target("/items").as_deref(), Some("/items/"));
        assert_eq!(slash_redirect_target("/health/").as_deref(), Some("/health"));
        assert_eq!(slash_redirect_target("/items/5/").as_deref(), Some("/items/5"));
        assert_eq!(slash_redirect_target("/nope/"), None);
        assert_eq!(slash_redirect_target("/nope"), None);
        assert_eq!(slash_redirect_target("/"), None);
        assert_eq!(slash_redirect_target("//"), None);
    }
}
