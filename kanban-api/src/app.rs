/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use kanban_api::{app::{build_router, AppState}, config::Config};
/// use kanban_shared::{
///     auth::jwt::JwtKeys,
///     repositories::Repositories,
///     services::Services,
/// };
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let keys = JwtKeys::from_config(config.jwt.secret.as_deref());
/// let services = Services::new(Repositories::postgres(pool.clone()), keys.clone());
///
/// let app = build_router(AppState::new(services, keys, config).with_db(pool));
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use kanban_shared::{
    auth::{jwt::JwtKeys, middleware::authenticate},
    services::Services,
};
use sqlx::PgPool;
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config::Config, error::ApiError, routes};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every field
/// is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,

    /// Verifies bearer tokens in the auth gate
    pub keys: JwtKeys,

    pub config: Arc<Config>,

    /// Only used by the health check; absent when running on in-memory storage
    pub db: Option<PgPool>,
}

impl AppState {
    pub fn new(services: Services, keys: JwtKeys, config: Config) -> Self {
        Self {
            services,
            keys,
            config: Arc::new(config),
            db: None,
        }
    }

    pub fn with_db(mut self, db: PgPool) -> Self {
        self.db = Some(db);
        self
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /health                              public
/// /api/v1/
/// ├── /health                          public
/// ├── /auth/register, /login, /refresh public
/// ├── /auth/me, /auth/logout
/// ├── /boards, /boards/:id, /boards/:id/columns
/// ├── /columns, /columns/:id
/// ├── /tasks, /tasks/:id, /tasks/:id/move
/// ├── /tasks/column/:column_id, /tasks/search
/// ├── /tasks/:id/labels, /tasks/:id/labels/:label_id
/// ├── /comments, /comments/:id, /comments/task/:task_id
/// ├── /attachments, /attachments/:id, /attachments/task/:task_id
/// └── /labels, /labels/:id
/// ```
///
/// Everything not marked public sits behind [`jwt_auth_layer`].
///
/// # Middleware Stack
///
/// Outermost first: rejection envelope, timeout, CORS, request tracing, then
/// the auth gate on the protected group. Unknown routes fall back to an
/// enveloped 404.
pub fn build_router(state: AppState) -> Router {
    let public_auth = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let protected = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/auth/logout", post(routes::auth::logout))
        .route(
            "/boards",
            get(routes::boards::list_boards).post(routes::boards::create_board),
        )
        .route(
            "/boards/:id",
            get(routes::boards::get_board)
                .put(routes::boards::update_board)
                .delete(routes::boards::delete_board),
        )
        .route("/boards/:id/columns", get(routes::columns::list_board_columns))
        .route("/columns", post(routes::columns::create_column))
        .route(
            "/columns/:id",
            get(routes::columns::get_column)
                .put(routes::columns::update_column)
                .delete(routes::columns::delete_column),
        )
        .route("/tasks", post(routes::tasks::create_task))
        .route("/tasks/search", get(routes::tasks::search_tasks))
        .route("/tasks/column/:column_id", get(routes::tasks::list_column_tasks))
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/tasks/:id/move", put(routes::tasks::move_task))
        .route("/tasks/:id/labels", get(routes::labels::list_task_labels))
        .route(
            "/tasks/:id/labels/:label_id",
            post(routes::labels::add_label_to_task).delete(routes::labels::remove_label_from_task),
        )
        .route("/comments", post(routes::comments::create_comment))
        .route(
            "/comments/:id",
            get(routes::comments::get_comment)
                .put(routes::comments::update_comment)
                .delete(routes::comments::delete_comment),
        )
        .route("/comments/task/:task_id", get(routes::comments::list_task_comments))
        .route("/attachments", post(routes::attachments::create_attachment))
        .route(
            "/attachments/:id",
            get(routes::attachments::get_attachment)
                .put(routes::attachments::update_attachment)
                .delete(routes::attachments::delete_attachment),
        )
        .route(
            "/attachments/task/:task_id",
            get(routes::attachments::list_task_attachments),
        )
        .route(
            "/labels",
            get(routes::labels::list_labels).post(routes::labels::create_label),
        )
        .route(
            "/labels/:id",
            get(routes::labels::get_label)
                .put(routes::labels::update_label)
                .delete(routes::labels::delete_label),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", public_auth)
        .merge(protected);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", v1_routes)
        .fallback(route_not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(TimeoutLayer::new(state.config.api.request_timeout))
        .layer(middleware::map_response(envelope_rejections))
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("route not found".to_string())
}

/// Renders the bodiless 405 and 408 produced by the router and the timeout
/// layer as the error envelope
async fn envelope_rejections(response: Response) -> Response {
    match response.status() {
        StatusCode::REQUEST_TIMEOUT => ApiError::Timeout.into_response(),
        StatusCode::METHOD_NOT_ALLOWED => {
            let allow = response.headers().get(header::ALLOW).cloned();
            let mut enveloped = ApiError::MethodNotAllowed.into_response();
            if let Some(allow) = allow {
                enveloped.headers_mut().insert(header::ALLOW, allow);
            }
            enveloped
        }
        _ => response,
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Auth gate for the protected route group
///
/// Resolves the bearer token to an `AuthContext` and stores it in the request
/// extensions. Rejected requests never reach a handler.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), &state.keys).map_err(|err| {
        tracing::debug!(error = %err, path = %req.uri().path(), "request rejected by auth gate");
        ApiError::from(err)
    })?;

    req.extensions_mut().insert(auth);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_timeout_gets_envelope() {
        let response = envelope_rejections(StatusCode::REQUEST_TIMEOUT.into_response()).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["message"], "request timed out");
    }

    #[tokio::test]
    async fn test_method_not_allowed_keeps_allow_header() {
        let bare = (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET,HEAD")],
        )
            .into_response();
        let response = envelope_rejections(bare).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET,HEAD");
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let response = envelope_rejections(StatusCode::NO_CONTENT.into_response()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
