/// Attachment metadata on tasks
///
/// The file itself lives in an external object store; only its name, URL
/// and size are recorded.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{gone, owned_task};
use crate::auth::authorization::require_owner;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    attachment::{Attachment, AttachmentChanges, NewAttachment},
    non_empty, Scoped,
};
use crate::pagination::{Page, Paginated};
use crate::repositories::{AttachmentRepository, TaskRepository};
use crate::validation::required;

#[derive(Clone)]
pub struct AttachmentService {
    tasks: Arc<dyn TaskRepository>,
    attachments: Arc<dyn AttachmentRepository>,
}

impl AttachmentService {
    pub fn new(tasks: Arc<dyn TaskRepository>, attachments: Arc<dyn AttachmentRepository>) -> Self {
        Self { tasks, attachments }
    }

    async fn owned(&self, attachment_id: Uuid, caller: Uuid) -> ServiceResult<Scoped<Attachment>> {
        let attachment = self
            .attachments
            .find_scoped(attachment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("attachment not found"))?;
        require_owner(caller, attachment)
    }

    pub async fn create(&self, caller: Uuid, attachment: NewAttachment) -> ServiceResult<Attachment> {
        let attachment = NewAttachment {
            file_name: required("file_name", &attachment.file_name)?,
            file_url: required("file_url", &attachment.file_url)?,
            ..attachment
        };
        owned_task(self.tasks.as_ref(), caller, attachment.task_id).await?;

        let attachment = self.attachments.create(attachment).await?;
        info!(attachment_id = %attachment.id, task_id = %attachment.task_id, "attachment created");
        Ok(attachment)
    }

    pub async fn find_by_id(&self, attachment_id: Uuid, caller: Uuid) -> ServiceResult<Attachment> {
        Ok(self.owned(attachment_id, caller).await?.into_inner())
    }

    pub async fn find_by_task(
        &self,
        task_id: Uuid,
        caller: Uuid,
        page: Page,
    ) -> ServiceResult<Paginated<Attachment>> {
        owned_task(self.tasks.as_ref(), caller, task_id).await?;

        let (attachments, total) = self.attachments.list_by_task(task_id, Some(page)).await?;
        Ok(Paginated::new(attachments, page, total))
    }

    /// Empty strings and a non-positive `file_size` leave fields unchanged
    pub async fn update(
        &self,
        attachment_id: Uuid,
        caller: Uuid,
        changes: AttachmentChanges,
    ) -> ServiceResult<Attachment> {
        self.owned(attachment_id, caller).await?;

        let changes = AttachmentChanges {
            file_name: non_empty(changes.file_name),
            file_url: non_empty(changes.file_url),
            file_size: changes.file_size.filter(|size| *size > 0),
        };
        self.attachments
            .update(attachment_id, changes)
            .await?
            .ok_or_else(|| gone("attachment"))
    }

    pub async fn delete(&self, attachment_id: Uuid, caller: Uuid) -> ServiceResult<()> {
        self.owned(attachment_id, caller).await?;

        if !self.attachments.soft_delete(attachment_id).await? {
            return Err(gone("attachment"));
        }
        info!(attachment_id = %attachment_id, "attachment deleted");
        Ok(())
    }
}
