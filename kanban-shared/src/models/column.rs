/// Column model
///
/// `order` is per-board and not unique; ties are broken by creation time.
/// It is stored as `position` because `order` is an SQL keyword.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE board_columns (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     position INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EntityKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Column {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    #[sqlx(rename = "position")]
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EntityKind for Column {
    const KIND: &'static str = "column";
}

#[derive(Debug, Clone)]
pub struct NewColumn {
    pub board_id: Uuid,
    pub title: String,
    pub order: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ColumnChanges {
    pub title: Option<String>,
    pub order: Option<i32>,
}

/// Sorts columns by `order`, then creation time
pub fn sort_columns(columns: &mut [Column]) {
    columns.sort_by(|a, b| a.order.cmp(&b.order).then(a.created_at.cmp(&b.created_at)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn column(title: &str, order: i32, created_at: DateTime<Utc>) -> Column {
        Column {
            id: Uuid::new_v4(),
            board_id: Uuid::nil(),
            title: title.into(),
            order,
            created_at,
            updated_at: created_at,
            deleted_at: None,
        }
    }

    #[test]
    fn test_sort_columns_breaks_ties_by_creation() {
        let t0 = Utc::now();
        let mut columns = vec![
            column("late", 1, t0 + Duration::seconds(5)),
            column("last", 2, t0),
            column("early", 1, t0),
        ];
        sort_columns(&mut columns);

        let titles: Vec<_> = columns.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["early", "late", "last"]);
    }

    #[test]
    fn test_order_serializes_as_order() {
        let json = serde_json::to_value(column("To Do", 1, Utc::now())).unwrap();
        assert_eq!(json["order"], 1);
    }
}
