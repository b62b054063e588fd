//! Request extractors that report which input field failed to deserialize.
//!
//! axum's `Json` and `Query` rejections only carry a message. These run the same
//! deserializers through `serde_path_to_error` so a 422 names the offending field,
//! e.g. `location.type` or `min_budget`.

use std::fmt::Display;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::{AppError, FieldError};

/// JSON body extractor with field-level errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Content type and syntax errors surface as `body`.
        let Json(value) = Json::<serde_json::Value>::from_request(req, state).await?;

        serde_path_to_error::deserialize(value)
            .map(ValidJson)
            .map_err(|err| AppError::Validation(vec![field_error("body", err)]))
    }
}

/// Query string extractor with field-level errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let deserializer =
            serde_urlencoded::Deserializer::new(form_urlencoded::parse(query.as_bytes()));

        serde_path_to_error::deserialize(deserializer)
            .map(ValidQuery)
            .map_err(|err| AppError::Validation(vec![field_error("query", err)]))
    }
}

/// Builds a [`FieldError`] from a path-tracked deserialization failure.
///
/// Errors at the root have no path; a missing field is named from the message and
/// anything else falls back to `fallback`.
fn field_error<E: Display>(fallback: &str, err: serde_path_to_error::Error<E>) -> FieldError {
    let message = err.inner().to_string();
    let path = err.path().to_string();

    let field = if path.is_empty() || path == "." {
        missing_field(&message).unwrap_or(fallback).to_string()
    } else {
        path
    };

    FieldError::new(field, message)
}

/// Extracts `name` from serde's "missing field `name`" message.
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    let end = rest.find('`')?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Site {
        name: String,
        position: Position,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Position {
        kind: Kind,
    }

    #[derive(Debug, Deserialize)]
    enum Kind {
        Point,
    }

    fn json_error(value: serde_json::Value) -> FieldError {
        let err = serde_path_to_error::deserialize::<_, Site>(value).unwrap_err();
        field_error("body", err)
    }

    #[test]
    fn nested_failures_are_named_by_path() {
        let error = json_error(json!({ "name": "Halle", "position": { "kind": "Polygon" } }));

        assert_eq!(error.field, "position.kind");
        assert!(error.message.contains("unknown variant"));
    }

    #[test]
    fn missing_fields_are_named_from_the_message() {
        assert_eq!(json_error(json!({ "position": { "kind": "Point" } })).field, "name");
        assert_eq!(missing_field("missing field `budget`"), Some("budget"));
        assert_eq!(missing_field("invalid type: string"), None);
    }

    #[test]
    fn root_failures_fall_back() {
        assert_eq!(json_error(json!("Halle")).field, "body");
    }
}
