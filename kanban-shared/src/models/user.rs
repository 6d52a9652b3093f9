/// User model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(100) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// CREATE UNIQUE INDEX users_username_key ON users (username) WHERE deleted_at IS NULL;
/// CREATE UNIQUE INDEX users_email_key ON users (LOWER(email)) WHERE deleted_at IS NULL;
/// ```
///
/// Users are created by registration and never hard-deleted through the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EntityKind;
use crate::auth::password::{self, PasswordError};

/// A user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Unique among live users
    pub username: String,

    /// Unique among live users, compared case-insensitively
    pub email: String,

    /// Argon2id PHC string; never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EntityKind for User {
    const KIND: &'static str = "user";
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// Normally a PHC hash; see [`NewUser::before_create`]
    pub password_hash: String,
}

impl NewUser {
    /// Pre-create hook run by every repository implementation
    ///
    /// If `password_hash` is not an Argon2 hash it is treated as a plaintext
    /// password and hashed here.
    pub fn before_create(mut self) -> Result<Self, PasswordError> {
        if !password::is_hashed(&self.password_hash) {
            self.password_hash = password::hash_password(&self.password_hash)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_before_create_hashes_plaintext() {
        let new_user = NewUser {
            username: "u".into(),
            email: "u@e.com".into(),
            password_hash: "password1".into(),
        }
        .before_create()
        .unwrap();

        assert!(new_user.password_hash.starts_with("$argon2id$"));
        assert!(password::verify_password("password1", &new_user.password_hash).unwrap());
    }

    #[test]
    fn test_before_create_keeps_existing_hash() {
        let hash = password::hash_password("password1").unwrap();
        let new_user = NewUser {
            username: "u".into(),
            email: "u@e.com".into(),
            password_hash: hash.clone(),
        }
        .before_create()
        .unwrap();

        assert_eq!(new_user.password_hash, hash);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: "u".into(),
            email: "u@e.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("deleted_at").is_none());
        assert_eq!(json["username"], "u");
    }
}
