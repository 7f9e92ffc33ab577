//! Request extractors that report failures as validation errors

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
    response::{IntoResponse, Response},
};

use crate::validation::{parse_body, FromJsonBody};

/// JSON body validated against `T`'s schema.
///
/// Unlike `axum::Json`, a request without a `Content-Type` is still parsed as
/// JSON, and every failing field is reported at once. A non-JSON content type
/// rejects the raw body as a whole.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: FromJsonBody,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .filter(|value| !value.trim().is_empty());

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let value = parse_body(content_type.as_deref(), &bytes).map_err(|err| {
            tracing::debug!(content_type = ?content_type, "Rejected request body: {}", err);
            err.into_response()
        })?;

        T::from_json(&value).map(ValidJson).map_err(|err| {
            tracing::debug!("Rejected request body: {}", err);
            err.into_response()
        })
    }
}
