/// Request extractors
///
/// [`ValidJson`] replaces `axum::Json` for request bodies: a body that does
/// not parse becomes a 400 "Invalid request body", and a parsed body is run
/// through its `validator` rules before the handler sees it.
///
/// [`ValidQuery`] and [`ValidPath`] wrap `Query` and `Path` so their
/// rejections render as the error envelope instead of plain text.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, INVALID_BODY, INVALID_PATH, INVALID_QUERY};

/// JSON body that has passed validation
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait::async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "rejected request body");
                ApiError::Validation {
                    message: INVALID_BODY.to_string(),
                    field: None,
                }
            })?;

        value.validate()?;
        Ok(ValidJson(value))
    }
}

/// Query string that deserialized into `T`
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

#[async_trait::async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "rejected query string");
                ApiError::Validation {
                    message: INVALID_QUERY.to_string(),
                    field: None,
                }
            })?;

        Ok(ValidQuery(value))
    }
}

/// Path parameters that deserialized into `T`
#[derive(Debug, Clone)]
pub struct ValidPath<T>(pub T);

#[async_trait::async_trait]
impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "rejected path parameters");
                ApiError::Validation {
                    message: INVALID_PATH.to_string(),
                    field: None,
                }
            })?;

        Ok(ValidPath(value))
    }
}

/// Parses a path or body id, naming `field` on failure
pub fn uuid_field(field: &str, value: &str) -> Result<Uuid, ApiError> {
    Ok(kanban_shared::validation::parse_uuid(field, value)?)
}
