//! API route definitions

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::cors::cors_layer;
use super::handlers::{
    self, ErrorResponse, HealthResponse, ItemLookupResponse, ItemResponse, MessageResponse,
};
use crate::config::Config;
use crate::error::Result;
use crate::types::Item;
use crate::validation::{ErrorKind, FieldError, ValidationError};

const ROOT: &str = "/";
const HEALTH: &str = "/health";
const ITEMS: &str = "/items/";
const ITEM: &str = "/items/{item_id}";

/// Paths served by the API, consulted by the trailing-slash redirect
pub(super) const ROUTE_PATHS: &[&str] = &[ROOT, HEALTH, ITEMS, ITEM];

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Item API",
        description = "Greeting, health check, item lookup and validated item creation"
    ),
    tags(
        (name = "meta", description = "Service information"),
        (name = "items", description = "Item lookup and validation"),
        (name = "health", description = "Health checks")
    ),
    paths(
        handlers::root,
        handlers::read_item,
        handlers::create_item,
        handlers::health,
    ),
    components(schemas(
        Item,
        MessageResponse,
        HealthResponse,
        ItemLookupResponse,
        ItemResponse,
        ErrorResponse,
        ValidationError,
        FieldError,
        ErrorKind,
    ))
)]
pub struct ApiDoc;

/// OpenAPI document rendered as pretty-printed JSON
pub fn openapi_json() -> Result<String> {
    Ok(ApiDoc::openapi().to_pretty_json()?)
}

/// Create the API router
pub fn create_router(config: &Config) -> Router {
    let openapi = ApiDoc::openapi();

    let router = Router::new()
        .route(ROOT, get(handlers::root))
        .route(HEALTH, get(handlers::health))

        // Items
        .route(ITEMS, post(handlers::create_item))
        .route(ITEM, get(handlers::read_item))

        // OpenAPI spec and Swagger UI
        .merge(SwaggerUi::new("/docs").url("/openapi.json", openapi))

        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed);

    let router = if config.cors.enabled {
        router.layer(cors_layer(&config.cors))
    } else {
        tracing::info!("CORS layer disabled");
        router
    };

    router.layer(TraceLayer::new_for_http())
}
