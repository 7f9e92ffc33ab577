//! Cross-origin policy

use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::{CorsConfig, WILDCARD};

/// Build the CORS layer for `config`.
///
/// A wildcard combined with credentials is never sent as a literal `*`
/// (browsers reject it on credentialed requests and tower-http refuses to
/// build it). The request's own origin is echoed on every response, cookies
/// or not, and a preflight allows exactly the method and headers it asked for
/// rather than a full list.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let credentials = config.allow_credentials;

    if config.is_wildcard_with_credentials() {
        tracing::warn!(
            "CORS allows any origin together with credentials; \
             every request origin will be echoed back as allowed"
        );
    }

    let origin = if config.allows_any_origin() {
        if credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::any()
        }
    } else {
        AllowOrigin::list(config.allow_origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| tracing::warn!("Ignoring invalid CORS origin: {}", origin))
                .ok()
        }))
    };

    let methods = if is_wildcard(&config.allow_methods) {
        if credentials {
            AllowMethods::mirror_request()
        } else {
            AllowMethods::any()
        }
    } else {
        AllowMethods::list(config.allow_methods.iter().filter_map(|method| {
            Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .inspect_err(|_| tracing::warn!("Ignoring invalid CORS method: {}", method))
                .ok()
        }))
    };

    let headers = if is_wildcard(&config.allow_headers) {
        if credentials {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::any()
        }
    } else {
        AllowHeaders::list(config.allow_headers.iter().filter_map(|header| {
            HeaderName::from_bytes(header.as_bytes())
                .inspect_err(|_| tracing::warn!("Ignoring invalid CORS header: {}", header))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(credentials)
        .max_age(Duration::from_secs(config.max_age_secs))
}

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v == WILDCARD)
}
