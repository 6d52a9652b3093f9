/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/auth/register` - Create an account (public)
/// - `POST /api/v1/auth/login` - Exchange credentials for tokens (public)
/// - `POST /api/v1/auth/refresh` - New access token from a refresh token (public)
/// - `POST /api/v1/auth/logout` - Revoke the caller's refresh tokens
/// - `GET  /api/v1/auth/me` - The caller's account

use axum::{extract::State, Extension, Json};
use kanban_shared::{
    auth::middleware::AuthContext,
    models::user::User,
    services::auth::{AccessToken, LoginTokens},
    validation::not_blank,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ValidJson,
    response::{ApiResponse, Message},
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "username is required"))]
    pub username: String,

    #[serde(default)]
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,

    /// Length is checked by the service
    #[serde(default)]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Refresh request
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

/// Register a new user
///
/// ```text
/// POST /api/v1/auth/register
///
/// { "username": "u", "email": "u@e.com", "password": "password1" }
/// ```
///
/// # Errors
///
/// - 400: missing field, malformed email, password under 8 characters
/// - 409: email or username already registered
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state
        .services
        .auth
        .register(req.username.trim(), req.email.trim(), &req.password)
        .await?;

    Ok(ApiResponse::ok(user))
}

/// Login with email and password
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginTokens>>> {
    let tokens = state
        .services
        .auth
        .login(req.email.trim(), &req.password)
        .await?;

    Ok(ApiResponse::ok(tokens))
}

pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<AccessToken>>> {
    let token = state.services.auth.refresh(req.refresh_token.trim()).await?;
    Ok(ApiResponse::ok(token))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ApiResponse<Message>>> {
    state.services.auth.logout(auth.user_id).await?;
    Ok(ApiResponse::message("logged out"))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state.services.auth.me(auth.user_id).await?;
    Ok(ApiResponse::ok(user))
}
