/// Request authentication primitives for the protected route group
///
/// The API's auth gate calls [`authenticate`] with the request headers. On
/// success it stores the returned [`AuthContext`] in the request extensions,
/// where handlers pick it up with Axum's `Extension` extractor.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use kanban_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{JwtError, JwtKeys};

/// Caller identity bound to an authenticated request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user id (the token's `sub`)
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Reasons the auth gate turns a request away
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("missing authorization header")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("authorization header must be a Bearer token")]
    InvalidFormat,

    /// Token failed verification
    #[error("{0}")]
    InvalidToken(#[from] JwtError),
}

/// Extracts the token from an `Authorization: Bearer <token>` header value
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(header_value: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header_value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidFormat)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidFormat);
    }

    Ok(token.trim())
}

/// Resolves the caller from request headers
pub fn authenticate(headers: &HeaderMap, keys: &JwtKeys) -> Result<AuthContext, AuthError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = bearer_token(header_value)?;
    let claims = keys.verify(token)?;

    Ok(AuthContext::new(claims.sub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenKind;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def").unwrap(), "abc.def");
        assert_eq!(bearer_token("bearer abc").unwrap(), "abc");
        assert!(matches!(bearer_token("Basic abc"), Err(AuthError::InvalidFormat)));
        assert!(matches!(bearer_token("Bearer"), Err(AuthError::InvalidFormat)));
    }

    #[test]
    fn test_authenticate() {
        let keys = JwtKeys::new("middleware-test-secret");
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id, TokenKind::Access).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let ctx = authenticate(&headers, &keys).unwrap();
        assert_eq!(ctx.user_id, user_id);
    }

    #[test]
    fn test_authenticate_missing_header() {
        let keys = JwtKeys::new("middleware-test-secret");
        let result = authenticate(&HeaderMap::new(), &keys);
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn test_authenticate_empty_token() {
        let keys = JwtKeys::new("middleware-test-secret");
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));

        let result = authenticate(&headers, &keys);
        assert!(result.is_err());
    }
}
