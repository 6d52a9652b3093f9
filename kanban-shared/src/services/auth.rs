/// Registration, login and token lifecycle
///
/// # Login failures
///
/// An unknown email and a wrong password produce the same
/// `Unauthorized("invalid email or password")`, so responses never reveal
/// whether an account exists.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{
    jwt::{JwtKeys, TokenKind},
    password,
};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{refresh_token::NewRefreshToken, user::{NewUser, User}};
use crate::repositories::{RefreshTokenRepository, UserRepository};
use crate::validation::{is_valid_email, require_non_empty};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Tokens returned by a successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginTokens {
    /// Access token (1 hour)
    pub token: String,
    /// Refresh token (7 days)
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// A fresh access token minted from a refresh token
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        keys: JwtKeys,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            keys,
        }
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<User> {
        password::check_length(password)?;
        require_non_empty("username", username)?;
        if !is_valid_email(email) {
            return Err(ServiceError::invalid_field("email", "email must be a valid email address"));
        }

        if self.users.find_by_email(email).await?.is_some() {
            return Err(ServiceError::conflict("email already exists"));
        }
        if self.users.find_by_username(username).await?.is_some() {
            return Err(ServiceError::conflict("username already exists"));
        }

        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: password::hash_password(password)?,
            })
            .await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<LoginTokens> {
        let Some(user) = self.users.find_by_email(email).await? else {
            password::verify_dummy(password);
            warn!("login failed: unknown email");
            return Err(ServiceError::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = password::verify_password(password, &user.password_hash).unwrap_or(false);
        if !matches {
            warn!(user_id = %user.id, "login failed: wrong password");
            return Err(ServiceError::unauthorized(INVALID_CREDENTIALS));
        }

        let token = self.keys.issue(user.id, TokenKind::Access)?;
        let refresh_token = self.keys.issue(user.id, TokenKind::Refresh)?;
        self.refresh_tokens
            .create(NewRefreshToken {
                user_id: user.id,
                token: refresh_token.clone(),
                expires_at: Utc::now() + TokenKind::Refresh.lifetime(),
            })
            .await?;

        info!(user_id = %user.id, "user logged in");
        Ok(LoginTokens {
            token,
            refresh_token,
            token_type: "Bearer",
            expires_in: TokenKind::Access.lifetime().num_seconds(),
        })
    }

    /// User id embedded in a valid access token
    pub fn validate_token(&self, token: &str) -> ServiceResult<Uuid> {
        Ok(self.keys.verify(token)?.sub)
    }

    /// Exchanges a live refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<AccessToken> {
        let claims = self.keys.verify(refresh_token)?;

        let stored = self
            .refresh_tokens
            .find_active(refresh_token)
            .await?
            .ok_or_else(|| ServiceError::unauthorized("invalid refresh token"))?;
        if stored.is_expired() || stored.user_id != claims.sub {
            return Err(ServiceError::unauthorized("invalid refresh token"));
        }

        if self.users.find_by_id(claims.sub).await?.is_none() {
            return Err(ServiceError::unauthorized("invalid refresh token"));
        }

        Ok(AccessToken {
            token: self.keys.issue(claims.sub, TokenKind::Access)?,
            token_type: "Bearer",
            expires_in: TokenKind::Access.lifetime().num_seconds(),
        })
    }

    /// Revokes every refresh token of `user_id`
    pub async fn logout(&self, user_id: Uuid) -> ServiceResult<()> {
        let revoked = self.refresh_tokens.revoke_for_user(user_id).await?;
        info!(user_id = %user_id, revoked, "user logged out");
        Ok(())
    }

    pub async fn me(&self, user_id: Uuid) -> ServiceResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user not found"))
    }
}
