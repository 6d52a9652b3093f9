/// Common test utilities for the HTTP tests
///
/// Builds the full router over the in-memory repositories and offers small
/// helpers for sending JSON requests and reading the envelope back.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use kanban_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig},
};
use kanban_shared::{auth::jwt::JwtKeys, repositories::Repositories, services::Services};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const PASSWORD: &str = "password1";

pub struct TestContext {
    pub app: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                request_timeout: Duration::from_secs(30),
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
                run_migrations: false,
            },
            jwt: JwtConfig {
                secret: Some("integration-test-secret".to_string()),
            },
        };

        let keys = JwtKeys::from_config(config.jwt.secret.as_deref());
        let services = Services::new(Repositories::in_memory(), keys.clone());

        Self {
            app: build_router(AppState::new(services, keys, config)),
        }
    }

    /// Sends one request; returns the status and the parsed JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, Some(token), None).await
    }

    /// Registers `name` (email `name@example.com`) and returns an access token
    pub async fn login_as(&self, name: &str) -> String {
        let email = format!("{}@example.com", name);

        let (status, body) = self
            .send(
                "POST",
                "/api/v1/auth/register",
                None,
                Some(json!({ "username": name, "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);

        let (status, body) = self
            .send(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Creates a board and returns its JSON (including columns)
    pub async fn create_board(&self, token: &str, title: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/v1/boards",
                token,
                json!({ "title": title, "color": "#f00" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create board failed: {}", body);
        body["data"].clone()
    }

    /// Creates a task in `column_id` and returns its id
    pub async fn create_task(&self, token: &str, column_id: &str, title: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/tasks",
                token,
                json!({ "column_id": column_id, "title": title, "description": "" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create task failed: {}", body);
        id_of(&body["data"])
    }
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

/// Id of the `index`th column of a board JSON
pub fn column_id(board: &Value, index: usize) -> String {
    id_of(&board["columns"][index])
}
