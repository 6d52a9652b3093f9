/// Attachment model
///
/// Only metadata is stored: the bytes live in an external object store and
/// are referenced by `file_url`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE attachments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     file_name VARCHAR(255) NOT NULL,
///     file_url TEXT NOT NULL,
///     file_size BIGINT NOT NULL DEFAULT 0,
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
pub struct Attachment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub file_name: String,
    pub file_url: String,
    /// Size in bytes
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EntityKind for Attachment {
    const KIND: &'static str = "attachment";
}

#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub task_id: Uuid,
    pub file_name: String,
    pub file_url: String,
    pub file_size: i64,
}

/// Partial update; `file_size` only changes when it is positive
#[derive(Debug, Clone, Default)]
pub struct AttachmentChanges {
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub file_size: Option<i64>,
}
