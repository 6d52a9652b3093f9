/// Label model
///
/// Labels are global rather than board-scoped. They attach to tasks through
/// the `task_labels` join table, keyed by `(task_id, label_id)`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE labels (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     color VARCHAR(32) NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// CREATE UNIQUE INDEX labels_name_key ON labels (name) WHERE deleted_at IS NULL;
///
/// CREATE TABLE task_labels (
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     label_id UUID NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (task_id, label_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EntityKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Label {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EntityKind for Label {
    const KIND: &'static str = "label";
}

#[derive(Debug, Clone)]
pub struct NewLabel {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Default)]
pub struct LabelChanges {
    pub name: Option<String>,
    pub color: Option<String>,
}
