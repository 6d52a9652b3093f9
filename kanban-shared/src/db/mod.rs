/// Database layer
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded migration runner
///
/// Queries live in [`crate::repositories::postgres`].

pub mod migrations;
pub mod pool;
