/// Task model
///
/// A task lives in exactly one column. Moving it rewrites `column_id` and
/// nothing else.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     column_id UUID NOT NULL REFERENCES board_columns(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     deadline TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{attachment::Attachment, comment::Comment, label::Label, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EntityKind for Task {
    const KIND: &'static str = "task";
}

impl Task {
    /// Case-insensitive substring match on the title
    pub fn title_contains(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(&needle.to_lowercase())
    }

    /// Case-insensitive substring match on title or description
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.title.to_lowercase().contains(&keyword)
            || self.description.to_lowercase().contains(&keyword)
    }
}

/// A task with its labels, comments and attachments loaded
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetails {
    #[serde(flatten)]
    pub task: Task,
    pub labels: Vec<Label>,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub column_id: Uuid,
    pub title: String,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
}

/// Partial update
///
/// `deadline`: `None` leaves it, `Some(None)` clears it, `Some(Some(t))`
/// sets it.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<Option<DateTime<Utc>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, description: &str) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            column_id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            deadline: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_title_contains_is_case_insensitive() {
        let t = task("Write Release Notes", "");
        assert!(t.title_contains("release"));
        assert!(t.title_contains("NOTES"));
        assert!(!t.title_contains("deploy"));
    }

    #[test]
    fn test_matches_keyword_checks_description() {
        let t = task("Ship", "Deploy to STAGING first");
        assert!(t.matches_keyword("staging"));
        assert!(t.matches_keyword("ship"));
        assert!(!t.matches_keyword("prod"));
    }
}
