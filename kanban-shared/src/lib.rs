//! # Kanban Shared Library
//!
//! Domain layer of the Kanban API: everything below the HTTP surface.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, bearer tokens, request authentication, ownership checks
//! - `error`: the tagged error kinds every service returns
//! - `models`: entity rows and their create/change inputs
//! - `repositories`: persistence traits with PostgreSQL and in-memory implementations
//! - `services`: ownership-checked domain operations
//! - `pagination`: page/limit clamping and list metadata
//! - `validation`: field-level input checks
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod repositories;
pub mod services;
pub mod validation;

/// Current version of the Kanban shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
