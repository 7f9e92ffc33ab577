//! Request validation with field-level error reporting
//!
//! Bodies are parsed into an untyped [`Value`] first and then checked field by
//! field, so a single response can list every offending field instead of
//! stopping at the first one.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{error::Category, Map, Value};
use utoipa::ToSchema;

/// Location segment of an offending input: an object key or a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Loc {
    Key(String),
    Index(usize),
}

impl From<&str> for Loc {
    fn from(key: &str) -> Self {
        Loc::Key(key.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Missing,
    StringType,
    FloatType,
    FloatParsing,
    IntParsing,
    JsonInvalid,
    ModelAttributesType,
}

impl ErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::Missing => "Field required",
            ErrorKind::StringType => "Input should be a valid string",
            ErrorKind::FloatType => "Input should be a valid number",
            ErrorKind::FloatParsing => {
                "Input should be a valid number, unable to parse string as a number"
            }
            ErrorKind::IntParsing => {
                "Input should be a valid integer, unable to parse string as an integer"
            }
            ErrorKind::JsonInvalid => "JSON decode error",
            ErrorKind::ModelAttributesType => {
                "Input should be a valid dictionary or object to extract fields from"
            }
        }
    }
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldError {
    /// Machine-readable error type
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// Path to the offending input, e.g. `["body", "price"]`
    #[schema(value_type = Vec<Object>)]
    pub loc: Vec<Loc>,
    /// Human-readable message
    pub msg: String,
    /// The input that failed validation
    #[schema(value_type = Object)]
    pub input: Value,
}

impl FieldError {
    pub fn new(kind: ErrorKind, loc: Vec<Loc>, input: Value) -> Self {
        Self {
            kind,
            loc,
            msg: kind.message().to_string(),
            input,
        }
    }
}

/// Rejection returned for any input that does not match its declared schema.
/// Rendered as `422 Unprocessable Entity` with a `detail` list.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, thiserror::Error)]
#[error("{} validation error(s)", .detail.len())]
pub struct ValidationError {
    pub detail: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(error: FieldError) -> Self {
        Self {
            detail: vec![error],
        }
    }

    /// Keys of every offending field, in reporting order
    pub fn fields(&self) -> Vec<String> {
        self.detail
            .iter()
            .filter_map(|e| match e.loc.last() {
                Some(Loc::Key(key)) => Some(key.clone()),
                _ => None,
            })
            .collect()
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(self)).into_response()
    }
}

/// Types built from a JSON request body.
pub trait FromJsonBody: Sized {
    fn from_json(value: &Value) -> Result<Self, ValidationError>;
}

/// Parse raw body bytes into an untyped JSON value.
///
/// An empty body counts as a missing body rather than malformed JSON. A body
/// sent with a non-JSON `Content-Type` is not parsed at all and fails as a
/// non-object input; a missing `Content-Type` is treated as JSON.
pub fn parse_body(content_type: Option<&str>, bytes: &[u8]) -> Result<Value, ValidationError> {
    if bytes.is_empty() {
        return Err(ValidationError::single(FieldError::new(
            ErrorKind::Missing,
            vec!["body".into()],
            Value::Null,
        )));
    }

    if !content_type.map_or(true, is_json_content_type) {
        return Err(ValidationError::single(FieldError::new(
            ErrorKind::ModelAttributesType,
            vec!["body".into()],
            Value::String(String::from_utf8_lossy(bytes).into_owned()),
        )));
    }

    serde_json::from_slice(bytes).map_err(|err| {
        ValidationError::single(FieldError::new(
            ErrorKind::JsonInvalid,
            vec!["body".into(), Loc::Index(error_offset(bytes, &err))],
            Value::Object(Map::new()),
        ))
    })
}

/// `application/json` or any `application/*+json` media type, parameters ignored.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

/// Character offset of a JSON syntax error within the body.
///
/// Truncated input reports the end of the body.
fn error_offset(bytes: &[u8], err: &serde_json::Error) -> usize {
    let byte_offset = if err.classify() == Category::Eof {
        bytes.len()
    } else {
        let preceding: usize = bytes
            .split(|b| *b == b'\n')
            .take(err.line().saturating_sub(1))
            .map(|line| line.len() + 1)
            .sum();
        (preceding + err.column().saturating_sub(1)).min(bytes.len())
    };
    String::from_utf8_lossy(&bytes[..byte_offset]).chars().count()
}

/// Parse a path parameter as an integer.
///
/// Surrounding whitespace and a leading `+` are accepted. The range is that of
/// `i64`; larger magnitudes fail as `int_parsing` like any other non-integer.
pub fn parse_int_param(name: &str, raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| int_parsing(name, raw))
}

fn int_parsing(name: &str, raw: &str) -> ValidationError {
    ValidationError::single(FieldError::new(
        ErrorKind::IntParsing,
        vec!["path".into(), name.into()],
        Value::String(raw.to_string()),
    ))
}

/// Field-by-field reader over a JSON object that accumulates errors.
pub struct ObjectFields<'a> {
    location: &'static str,
    input: &'a Value,
    object: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> ObjectFields<'a> {
    /// Start reading `input`, which must be a JSON object.
    pub fn new(location: &'static str, input: &'a Value) -> Result<Self, ValidationError> {
        match input {
            Value::Object(object) => Ok(Self {
                location,
                input,
                object,
                errors: Vec::new(),
            }),
            other => Err(ValidationError::single(FieldError::new(
                ErrorKind::ModelAttributesType,
                vec![location.into()],
                other.clone(),
            ))),
        }
    }

    pub fn required_str(&mut self, name: &str) -> Option<String> {
        self.required(name, coerce_str)
    }

    pub fn optional_str(&mut self, name: &str) -> Option<String> {
        self.optional(name, coerce_str)
    }

    pub fn required_f64(&mut self, name: &str) -> Option<f64> {
        self.required(name, coerce_f64)
    }

    pub fn optional_f64(&mut self, name: &str) -> Option<f64> {
        self.optional(name, coerce_f64)
    }

    /// Succeeds only if no field has failed so far.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    /// Every error collected so far.
    pub fn into_error(self) -> ValidationError {
        ValidationError {
            detail: self.errors,
        }
    }

    fn required<T>(
        &mut self,
        name: &str,
        coerce: fn(&Value) -> Result<T, ErrorKind>,
    ) -> Option<T> {
        let object = self.object;
        match object.get(name) {
            Some(value) => self.apply(name, value, coerce),
            None => {
                let input = self.input.clone();
                self.push(ErrorKind::Missing, name, input);
                None
            }
        }
    }

    fn optional<T>(
        &mut self,
        name: &str,
        coerce: fn(&Value) -> Result<T, ErrorKind>,
    ) -> Option<T> {
        let object = self.object;
        match object.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => self.apply(name, value, coerce),
        }
    }

    fn apply<T>(
        &mut self,
        name: &str,
        value: &Value,
        coerce: fn(&Value) -> Result<T, ErrorKind>,
    ) -> Option<T> {
        match coerce(value) {
            Ok(v) => Some(v),
            Err(kind) => {
                self.push(kind, name, value.clone());
                None
            }
        }
    }

    fn push(&mut self, kind: ErrorKind, name: &str, input: Value) {
        self.errors.push(FieldError::new(
            kind,
            vec![self.location.into(), name.into()],
            input,
        ));
    }
}

fn coerce_str(value: &Value) -> Result<String, ErrorKind> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(ErrorKind::StringType),
    }
}

fn coerce_f64(value: &Value) -> Result<f64, ErrorKind> {
    match value {
        Value::Number(n) => n.as_f64().ok_or(ErrorKind::FloatType),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ErrorKind::FloatParsing),
        },
        _ => Err(ErrorKind::FloatType),
    }
}
