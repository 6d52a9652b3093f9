/// Board model
///
/// A board is exclusively owned by one user; every column, task, comment and
/// attachment below it inherits that ownership. The owner never changes.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     color VARCHAR(32) NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{column::Column, EntityKind};

/// Columns seeded into every new board, as `(title, order)`
pub const DEFAULT_COLUMNS: [(&str, i32); 3] = [("To Do", 1), ("In Progress", 2), ("Done", 3)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    pub id: Uuid,

    /// Owner
    pub user_id: Uuid,

    pub title: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EntityKind for Board {
    const KIND: &'static str = "board";
}

/// A board with its live columns, ordered by `order` then creation time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardWithColumns {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone)]
pub struct NewBoard {
    pub user_id: Uuid,
    pub title: String,
    pub color: String,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct BoardChanges {
    pub title: Option<String>,
    pub color: Option<String>,
}

impl BoardChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.color.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_columns() {
        let titles: Vec<_> = DEFAULT_COLUMNS.iter().map(|(t, _)| *t).collect();
        let orders: Vec<_> = DEFAULT_COLUMNS.iter().map(|(_, o)| *o).collect();
        assert_eq!(titles, ["To Do", "In Progress", "Done"]);
        assert_eq!(orders, [1, 2, 3]);
    }

    #[test]
    fn test_board_with_columns_flattens() {
        let now = Utc::now();
        let board = Board {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "B".into(),
            color: "#f00".into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let json = serde_json::to_value(BoardWithColumns {
            board,
            columns: vec![],
        })
        .unwrap();

        assert_eq!(json["title"], "B");
        assert!(json["columns"].as_array().unwrap().is_empty());
    }
}
