//! HTTP API layer

mod cors;
mod extract;
mod handlers;
mod routes;

pub use cors::cors_layer;
pub use extract::ValidJson;
pub use handlers::GREETING;
pub use routes::{create_router, openapi_json, ApiDoc};
