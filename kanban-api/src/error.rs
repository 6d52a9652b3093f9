/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Errors render as the response
/// envelope with `success: false`:
///
/// ```json
/// { "success": false, "error": { "message": "password must be at least 8 characters", "field": "password" } }
/// ```
///
/// Service errors are translated by variant only:
///
/// | `ServiceError`           | Status |
/// |--------------------------|--------|
/// | `NotFound`               | 404    |
/// | `Unauthorized`           | 401    |
/// | `Validation`             | 400    |
/// | `Conflict`               | 409    |
/// | `Database` / `Internal`  | 500    |
///
/// Rejections produced outside the handlers (unknown route, wrong method,
/// request deadline) are rendered in the same envelope; see
/// [`crate::app::build_router`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kanban_shared::{
    auth::{jwt::JwtError, middleware::AuthError},
    error::ServiceError,
};
use serde::{Deserialize, Serialize};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400, optionally naming the offending field
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// 401
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 405
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// 408; the request outlived its deadline
    #[error("Request timed out")]
    Timeout,

    /// 409
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 500; the message is logged, never returned
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// `error` member of the envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Failure envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, field) = match self {
            ApiError::Validation { message, field } => (message, field),
            ApiError::Unauthorized(msg) | ApiError::NotFound(msg) | ApiError::Conflict(msg) => {
                (msg, None)
            }
            ApiError::MethodNotAllowed => ("method not allowed".to_string(), None),
            ApiError::Timeout => ("request timed out".to_string(), None),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("An internal error occurred".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorBody { message, field },
        });

        (status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            ServiceError::Validation { message, field } => ApiError::Validation { message, field },
            ServiceError::Conflict(msg) => ApiError::Conflict(msg),
            ServiceError::Database(e) => ApiError::Internal(format!("database error: {}", e)),
            ServiceError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(jwt) => jwt.into(),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        ServiceError::from(err).into()
    }
}

/// Reports the first failing field, in field-name order
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.into_iter().next() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                ApiError::invalid_field(field.to_string(), message)
            }
            None => ApiError::Validation {
                message: INVALID_BODY.to_string(),
                field: None,
            },
        }
    }
}

/// Message for bodies that are not the expected JSON
pub const INVALID_BODY: &str = "Invalid request body";

/// Message for query strings that do not deserialize
pub const INVALID_QUERY: &str = "Invalid query parameters";

/// Message for path segments that do not deserialize
pub const INVALID_PATH: &str = "Invalid path parameter";

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_service_errors_map_by_variant() {
        let cases = [
            (ServiceError::not_found("x"), StatusCode::NOT_FOUND),
            (ServiceError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (ServiceError::validation("x"), StatusCode::BAD_REQUEST),
            (ServiceError::conflict("x"), StatusCode::CONFLICT),
            (ServiceError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ServiceError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn test_validation_envelope_carries_field() {
        let response = ApiError::invalid_field("title", "title is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["field"], "title");
        assert_eq!(json["error"]["message"], "title is required");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response = ApiError::Internal("connection refused on 10.0.0.5".into()).into_response();
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
        assert!(json["error"].get("field").is_none());
    }

    #[tokio::test]
    async fn test_timeout_and_method_render_envelope() {
        let response = ApiError::Timeout.into_response();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["message"], "request timed out");

        let response = ApiError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[derive(validator::Validate)]
    struct Body {
        #[validate(length(min = 1, message = "title is required"))]
        title: String,
        #[validate(length(min = 1))]
        color: String,
    }

    #[test]
    fn test_validation_errors_name_first_field() {
        use validator::Validate;

        let errors = Body {
            title: String::new(),
            color: String::new(),
        }
        .validate()
        .unwrap_err();

        match ApiError::from(errors) {
            ApiError::Validation { message, field } => {
                assert_eq!(field.as_deref(), Some("color"));
                assert_eq!(message, "color is invalid");
            }
            other => panic!("unexpected {:?}", other),
        }

        let errors = Body {
            title: String::new(),
            color: "#fff".into(),
        }
        .validate()
        .unwrap_err();
        assert!(matches!(
            ApiError::from(errors),
            ApiError::Validation { message, .. } if message == "title is required"
        ));
    }

    #[test]
    fn test_auth_errors_are_unauthorized() {
        assert_eq!(
            ApiError::from(AuthError::MissingCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidFormat).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidToken(JwtError::Expired)).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
