/// Bearer token issuance and verification
///
/// Tokens are JWTs signed with HS256 (HMAC-SHA256). The payload carries the
/// registered claims only: `sub` (user id), `iat`, `nbf` and `exp`.
///
/// # Token Kinds
///
/// - **Access**: expires after 1 hour
/// - **Refresh**: expires after 7 days
///
/// Both kinds share the same encoding; only the expiry differs.
///
/// # Verification
///
/// A token is rejected when it is empty, the signature does not verify, the
/// header names any algorithm other than HS256, `nbf` lies in the future, or
/// `now > exp`. No clock leeway is applied.
///
/// # Example
///
/// ```
/// use kanban_shared::auth::jwt::{JwtKeys, TokenKind};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let keys = JwtKeys::new("a-secret-key-that-is-long-enough-to-use");
/// let user_id = Uuid::new_v4();
///
/// let token = keys.issue(user_id, TokenKind::Access)?;
/// let claims = keys.verify(&token)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signing key used when no `JWT_SECRET` is configured
///
/// Only suitable for local development.
pub const DEFAULT_SECRET: &str = "kanban-development-secret-change-me-in-production";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// No token was presented
    #[error("Token is empty")]
    Empty,

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is not valid yet
    #[error("Token is not valid yet")]
    NotYetValid,

    /// Header names an algorithm other than HS256
    #[error("Unexpected signing algorithm")]
    InvalidAlgorithm,

    /// Signature or structure check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),
}

/// Token kind, which only determines the lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn lifetime(&self) -> Duration {
        match self {
            TokenKind::Access => Duration::hours(1),
            TokenKind::Refresh => Duration::days(7),
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: Uuid,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for `user_id` with the lifetime of `kind`
    pub fn new(user_id: Uuid, kind: TokenKind) -> Self {
        Self::with_expiration(user_id, kind.lifetime())
    }

    /// Claims with a custom lifetime (negative values produce expired claims)
    pub fn with_expiration(user_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Process-wide signing state
///
/// Built once at startup from configuration and shared through the
/// application state.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JwtKeys { .. }")
    }
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Keys from an optional configured secret, falling back to
    /// [`DEFAULT_SECRET`]
    pub fn from_config(secret: Option<&str>) -> Self {
        match secret {
            Some(secret) if !secret.is_empty() => Self::new(secret),
            _ => {
                tracing::warn!("JWT_SECRET is not set; using the built-in development key");
                Self::new(DEFAULT_SECRET)
            }
        }
    }

    /// Signs `claims` with HS256
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Issues a fresh token of `kind` for `user_id`
    pub fn issue(&self, user_id: Uuid, kind: TokenKind) -> Result<String, JwtError> {
        self.sign(&Claims::new(user_id, kind))
    }

    /// Verifies `token` and returns its claims
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        if token.trim().is_empty() {
            return Err(JwtError::Empty);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::ImmatureSignature => JwtError::NotYetValid,
                ErrorKind::InvalidAlgorithm => JwtError::InvalidAlgorithm,
                _ => JwtError::ValidationError(e.to_string()),
            }
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_kind_lifetime() {
        assert_eq!(TokenKind::Access.lifetime(), Duration::hours(1));
        assert_eq!(TokenKind::Refresh.lifetime(), Duration::days(7));
    }

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, TokenKind::Access);

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iat, claims.nbf);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_issue_and_verify() {
        let keys = JwtKeys::new(SECRET);
        let user_id = Uuid::new_v4();

        let token = keys.issue(user_id, TokenKind::Access).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);

        let refresh = keys.issue(user_id, TokenKind::Refresh).unwrap();
        let claims = keys.verify(&refresh).unwrap();
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn test_verify_empty_token() {
        let keys = JwtKeys::new(SECRET);
        assert!(matches!(keys.verify(""), Err(JwtError::Empty)));
        assert!(matches!(keys.verify("   "), Err(JwtError::Empty)));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let token = JwtKeys::new("secret-one").issue(Uuid::new_v4(), TokenKind::Access).unwrap();
        let result = JwtKeys::new("secret-two").verify(&token);
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_verify_expired_token() {
        let keys = JwtKeys::new(SECRET);
        let claims = Claims::with_expiration(Uuid::new_v4(), Duration::seconds(-10));
        assert!(claims.is_expired());

        let token = keys.sign(&claims).unwrap();
        assert!(matches!(keys.verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_verify_rejects_other_algorithm() {
        let claims = Claims::new(Uuid::new_v4(), TokenKind::Access);
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = JwtKeys::new(SECRET).verify(&token);
        assert!(matches!(result, Err(JwtError::InvalidAlgorithm)));
    }

    #[test]
    fn test_verify_not_yet_valid() {
        let keys = JwtKeys::new(SECRET);
        let mut claims = Claims::new(Uuid::new_v4(), TokenKind::Access);
        claims.nbf += 600;

        let token = keys.sign(&claims).unwrap();
        assert!(matches!(keys.verify(&token), Err(JwtError::NotYetValid)));
    }

    #[test]
    fn test_verify_garbage() {
        let keys = JwtKeys::new(SECRET);
        assert!(keys.verify("not.a.jwt").is_err());
    }

    #[test]
    fn test_from_config_fallback() {
        let user_id = Uuid::new_v4();
        let token = JwtKeys::from_config(None).issue(user_id, TokenKind::Access).unwrap();
        let claims = JwtKeys::new(DEFAULT_SECRET).verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);
    }
}
