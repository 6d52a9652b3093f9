/// Error taxonomy shared by repositories and services
///
/// Services speak only in these variants. The HTTP layer translates them by
/// variant, never by message text:
///
/// | Variant        | HTTP |
/// |----------------|------|
/// | `NotFound`     | 404  |
/// | `Unauthorized` | 401  |
/// | `Validation`   | 400  |
/// | `Conflict`     | 409  |
/// | anything else  | 500  |
///
/// # Example
///
/// ```
/// use kanban_shared::error::{ServiceError, ServiceResult};
///
/// fn find(id: u32) -> ServiceResult<u32> {
///     if id == 0 {
///         return Err(ServiceError::not_found("board not found"));
///     }
///     Ok(id)
/// }
///
/// assert!(matches!(find(0), Err(ServiceError::NotFound(_))));
/// ```

use crate::auth::{jwt::JwtError, password::PasswordError};

/// Result alias used across repositories and services
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Tagged error kinds produced by the domain layer
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Entity missing or soft-deleted
    #[error("{0}")]
    NotFound(String),

    /// Missing/invalid credential, or the caller does not own the entity
    #[error("{0}")]
    Unauthorized(String),

    /// Input rejected; `field` is set when a single field is to blame
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Uniqueness violation at create/update time
    #[error("{0}")]
    Conflict(String),

    /// Untagged persistence failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Any other failure (hashing, token signing)
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ServiceError::Unauthorized(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }

    /// Validation failure not attributable to one field
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Validation failure naming the offending field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort { min } => ServiceError::invalid_field(
                "password",
                format!("password must be at least {} characters", min),
            ),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ServiceError::Internal(msg),
            JwtError::Expired => ServiceError::unauthorized("token has expired"),
            JwtError::Empty => ServiceError::unauthorized("missing token"),
            other => ServiceError::unauthorized(format!("invalid token: {}", other)),
        }
    }
}

/// Maps a unique-constraint violation to `Conflict`, everything else to `Database`
///
/// `message` is the client-facing conflict text.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> ServiceError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ServiceError::conflict(message)
        }
        _ => ServiceError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(matches!(ServiceError::not_found("x"), ServiceError::NotFound(m) if m == "x"));
        assert!(matches!(
            ServiceError::invalid_field("title", "title is required"),
            ServiceError::Validation { field: Some(f), .. } if f == "title"
        ));
        assert!(matches!(
            ServiceError::validation("bad"),
            ServiceError::Validation { field: None, .. }
        ));
    }

    #[test]
    fn test_password_too_short_maps_to_field_error() {
        let err: ServiceError = PasswordError::TooShort { min: 8 }.into();
        match err {
            ServiceError::Validation { message, field } => {
                assert_eq!(field.as_deref(), Some("password"));
                assert!(message.contains("8 characters"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_jwt_errors_map_to_unauthorized() {
        let err: ServiceError = JwtError::Expired.into();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let err: ServiceError = JwtError::ValidationError("bad signature".into()).into();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let err: ServiceError = JwtError::CreateError("boom".into()).into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }
}
