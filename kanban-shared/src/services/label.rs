/// Global labels and their task associations
///
/// Labels are shared by every user, so label CRUD needs only an
/// authenticated caller. Attaching and detaching check ownership of the task.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{gone, owned_task};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    label::{Label, LabelChanges, NewLabel},
    non_empty,
};
use crate::pagination::{Page, Paginated};
use crate::repositories::{LabelRepository, TaskRepository};
use crate::validation::required;

#[derive(Clone)]
pub struct LabelService {
    tasks: Arc<dyn TaskRepository>,
    labels: Arc<dyn LabelRepository>,
}

impl LabelService {
    pub fn new(tasks: Arc<dyn TaskRepository>, labels: Arc<dyn LabelRepository>) -> Self {
        Self { tasks, labels }
    }

    /// Name and color are stored trimmed
    pub async fn create(&self, name: &str, color: &str) -> ServiceResult<Label> {
        let label = self
            .labels
            .create(NewLabel {
                name: required("name", name)?,
                color: color.trim().to_string(),
            })
            .await?;

        info!(label_id = %label.id, "label created");
        Ok(label)
    }

    pub async fn find_by_id(&self, label_id: Uuid) -> ServiceResult<Label> {
        self.labels
            .find_by_id(label_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("label not found"))
    }

    pub async fn find_all(&self, page: Page) -> ServiceResult<Paginated<Label>> {
        let (labels, total) = self.labels.list(page).await?;
        Ok(Paginated::new(labels, page, total))
    }

    /// Values are trimmed; blank strings leave fields unchanged
    pub async fn update(&self, label_id: Uuid, changes: LabelChanges) -> ServiceResult<Label> {
        self.find_by_id(label_id).await?;

        let changes = LabelChanges {
            name: non_empty(changes.name),
            color: non_empty(changes.color),
        };
        self.labels
            .update(label_id, changes)
            .await?
            .ok_or_else(|| gone("label"))
    }

    pub async fn delete(&self, label_id: Uuid) -> ServiceResult<()> {
        if !self.labels.soft_delete(label_id).await? {
            return Err(ServiceError::not_found("label not found"));
        }
        info!(label_id = %label_id, "label deleted");
        Ok(())
    }

    /// Attaches `label_id` to the caller's task; re-adding is a no-op
    pub async fn add_to_task(&self, task_id: Uuid, label_id: Uuid, caller: Uuid) -> ServiceResult<()> {
        owned_task(self.tasks.as_ref(), caller, task_id).await?;
        self.find_by_id(label_id).await?;

        self.labels.attach(task_id, label_id).await?;
        info!(task_id = %task_id, label_id = %label_id, "label attached");
        Ok(())
    }

    /// Detaches `label_id`; removing an absent label is a no-op
    pub async fn remove_from_task(
        &self,
        task_id: Uuid,
        label_id: Uuid,
        caller: Uuid,
    ) -> ServiceResult<()> {
        owned_task(self.tasks.as_ref(), caller, task_id).await?;

        self.labels.detach(task_id, label_id).await?;
        info!(task_id = %task_id, label_id = %label_id, "label detached");
        Ok(())
    }

    pub async fn find_by_task(&self, task_id: Uuid, caller: Uuid) -> ServiceResult<Vec<Label>> {
        owned_task(self.tasks.as_ref(), caller, task_id).await?;
        self.labels.list_for_task(task_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{NewTask, Task};
    use crate::services::{
        testing::{board, services, user},
        Services,
    };

    async fn task_for(services: &Services, owner: Uuid) -> Task {
        let b = board(services, owner, "B").await;
        services
            .tasks
            .create(
                owner,
                NewTask {
                    column_id: b.columns[0].id,
                    title: "t".into(),
                    description: String::new(),
                    deadline: None,
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_names_are_stored_trimmed() {
        let services = services();
        let bug = services.labels.create(" bug ", "#f00").await.unwrap();
        assert_eq!(bug.name, "bug");

        let other = services.labels.create("feature", "#0f0").await.unwrap();
        let err = services
            .labels
            .update(
                other.id,
                LabelChanges {
                    name: Some("  bug  ".into()),
                    color: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let err = services.labels.create("   ", "#000").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: Some(f), .. } if f == "name"));
    }

    #[tokio::test]
    async fn test_add_twice_leaves_one_association() {
        let services = services();
        let u = user(&services, "alice").await;
        let task = task_for(&services, u.id).await;
        let label = services.labels.create("bug", "#f00").await.unwrap();

        services.labels.add_to_task(task.id, label.id, u.id).await.unwrap();
        services.labels.add_to_task(task.id, label.id, u.id).await.unwrap();

        let labels = services.labels.find_by_task(task.id, u.id).await.unwrap();
        assert_eq!(labels.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_detaches_and_is_idempotent() {
        let services = services();
        let u = user(&services, "alice").await;
        let task = task_for(&services, u.id).await;
        let label = services.labels.create("bug", "#f00").await.unwrap();
        let other = services.labels.create("feature", "#0f0").await.unwrap();

        services.labels.add_to_task(task.id, label.id, u.id).await.unwrap();
        services.labels.remove_from_task(task.id, label.id, u.id).await.unwrap();
        assert!(services.labels.find_by_task(task.id, u.id).await.unwrap().is_empty());

        // never attached
        services.labels.remove_from_task(task.id, other.id, u.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_attach_to_foreign_task_denied() {
        let services = services();
        let alice = user(&services, "alice").await;
        let bob = user(&services, "bob").await;
        let task = task_for(&services, alice.id).await;
        let label = services.labels.create("bug", "#f00").await.unwrap();

        let err = services
            .labels
            .add_to_task(task.id, label.id, bob.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let services = services();
        services.labels.create("bug", "#f00").await.unwrap();
        let err = services.labels.create("bug", "#0f0").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_attach_missing_label_not_found() {
        let services = services();
        let u = user(&services, "alice").await;
        let task = task_for(&services, u.id).await;

        let err = services
            .labels
            .add_to_task(task.id, Uuid::new_v4(), u.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
