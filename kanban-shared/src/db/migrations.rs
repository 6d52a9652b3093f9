/// Embedded schema migrations
///
/// The SQL files under the workspace `migrations/` directory are compiled
/// into the binary with `sqlx::migrate!` and applied at startup unless
/// `RUN_MIGRATIONS=false`.
///
/// # Example
///
/// ```no_run
/// use kanban_shared::db::migrations::run_migrations;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Applies every pending migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Migration failed");
            Err(e)
        }
    }
}

/// Creates the database named in `database_url` if it is missing
///
/// Used by the repository integration tests.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("Database already exists");
    }
    Ok(())
}
