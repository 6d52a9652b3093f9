/// Entity models for the Kanban service
///
/// Each module defines the row struct for one table plus the input structs
/// used to create and change it. Persistence lives in
/// [`crate::repositories`]; these types carry no behavior beyond simple
/// projections.
///
/// # Models
///
/// - `user`: accounts; own boards and author comments
/// - `refresh_token`: long-lived tokens issued at login
/// - `board`: top-level container owned by one user
/// - `column`: ordered bucket of tasks within a board
/// - `task`: work item within a column
/// - `comment`, `attachment`: children of a task
/// - `label`: global tags attached to tasks through `task_labels`
///
/// # Ownership chain
///
/// ```text
/// Comment ─┐
///          ├─> Task -> Column -> Board -> User
/// Attachment┘
/// ```

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{postgres::PgRow, Row};
use uuid::Uuid;

pub mod attachment;
pub mod board;
pub mod column;
pub mod comment;
pub mod label;
pub mod refresh_token;
pub mod task;
pub mod user;

/// Human-readable entity name used in error messages
pub trait EntityKind {
    const KIND: &'static str;
}

/// An entity loaded together with the board it hangs under
///
/// Produced by the repositories' `find_scoped` queries, which join up the
/// ownership chain in one round trip. `owner_id` is the board's `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scoped<T> {
    pub entity: T,
    pub board_id: Uuid,
    pub owner_id: Uuid,
}

impl<T> Scoped<T> {
    pub fn new(entity: T, board_id: Uuid, owner_id: Uuid) -> Self {
        Self {
            entity,
            board_id,
            owner_id,
        }
    }

    pub fn into_inner(self) -> T {
        self.entity
    }
}

/// Reads the entity's own columns plus `scope_board_id` and `scope_owner_id`
impl<'r, T> sqlx::FromRow<'r, PgRow> for Scoped<T>
where
    T: sqlx::FromRow<'r, PgRow>,
{
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            entity: T::from_row(row)?,
            board_id: row.try_get("scope_board_id")?,
            owner_id: row.try_get("scope_owner_id")?,
        })
    }
}

/// Deserializes a present field (including `null`) as `Some(..)`
///
/// Combined with `#[serde(default)]` this distinguishes an absent field
/// (`None`) from an explicit `null` (`Some(None)`).
pub fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Trims a supplied value; blank counts as "not provided"
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        deadline: Option<Option<String>>,
    }

    #[test]
    fn test_deserialize_some_distinguishes_null_and_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.deadline, None);

        let null: Patch = serde_json::from_str(r#"{"deadline":null}"#).unwrap();
        assert_eq!(null.deadline, Some(None));

        let set: Patch = serde_json::from_str(r#"{"deadline":"x"}"#).unwrap();
        assert_eq!(set.deadline, Some(Some("x".to_string())));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some("a".into())), Some("a".to_string()));
        assert_eq!(non_empty(Some(" bug ".into())), Some("bug".to_string()));
    }
}
