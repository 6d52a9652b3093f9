//! # Kanban API Server
//!
//! Boards, columns, tasks, comments, attachments and labels over HTTP/JSON,
//! backed by PostgreSQL.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/kanban cargo run -p kanban-api
//! ```
//!
//! See [`kanban_api::config`] for the environment variables.

use anyhow::Context;
use kanban_api::{
    app::{build_router, AppState},
    config::Config,
};
use kanban_shared::{
    auth::jwt::JwtKeys,
    db::{migrations::run_migrations, pool},
    repositories::Repositories,
    services::Services,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // LOG_FORMAT and RUST_LOG may come from .env
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Kanban API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("failed to connect to the database")?;

    if config.database.run_migrations {
        run_migrations(&db).await.context("failed to run migrations")?;
    }

    let keys = JwtKeys::from_config(config.jwt.secret.as_deref());
    let services = Services::new(Repositories::postgres(db.clone()), keys.clone());

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(services, keys, config).with_db(db.clone()));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    tracing::info!("Server stopped");

    Ok(())
}

/// `RUST_LOG` filter, human-readable by default, JSON lines with `LOG_FORMAT=json`
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kanban_api=debug,kanban_shared=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
