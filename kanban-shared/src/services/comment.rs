/// Comments on tasks
///
/// Every operation, reads included, is authorized by walking the comment's
/// task up to its board. The author id is recorded but grants nothing.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{gone, owned_task};
use crate::auth::authorization::require_owner;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    comment::{Comment, NewComment},
    non_empty, Scoped,
};
use crate::pagination::{Page, Paginated};
use crate::repositories::{CommentRepository, TaskRepository};
use crate::validation::required;

#[derive(Clone)]
pub struct CommentService {
    tasks: Arc<dyn TaskRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(tasks: Arc<dyn TaskRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { tasks, comments }
    }

    async fn owned(&self, comment_id: Uuid, caller: Uuid) -> ServiceResult<Scoped<Comment>> {
        let comment = self
            .comments
            .find_scoped(comment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("comment not found"))?;
        require_owner(caller, comment)
    }

    /// Adds a comment authored by `caller`
    pub async fn create(&self, caller: Uuid, task_id: Uuid, content: &str) -> ServiceResult<Comment> {
        let content = required("content", content)?;
        owned_task(self.tasks.as_ref(), caller, task_id).await?;

        let comment = self
            .comments
            .create(NewComment {
                task_id,
                user_id: caller,
                content,
            })
            .await?;

        info!(comment_id = %comment.id, task_id = %task_id, "comment created");
        Ok(comment)
    }

    pub async fn find_by_id(&self, comment_id: Uuid, caller: Uuid) -> ServiceResult<Comment> {
        Ok(self.owned(comment_id, caller).await?.into_inner())
    }

    pub async fn find_by_task(
        &self,
        task_id: Uuid,
        caller: Uuid,
        page: Page,
    ) -> ServiceResult<Paginated<Comment>> {
        owned_task(self.tasks.as_ref(), caller, task_id).await?;

        let (comments, total) = self.comments.list_by_task(task_id, Some(page)).await?;
        Ok(Paginated::new(comments, page, total))
    }

    /// An empty or absent `content` leaves the comment unchanged
    pub async fn update(
        &self,
        comment_id: Uuid,
        caller: Uuid,
        content: Option<String>,
    ) -> ServiceResult<Comment> {
        let current = self.owned(comment_id, caller).await?;

        let Some(content) = non_empty(content) else {
            return Ok(current.into_inner());
        };
        self.comments
            .update(comment_id, content)
            .await?
            .ok_or_else(|| gone("comment"))
    }

    pub async fn delete(&self, comment_id: Uuid, caller: Uuid) -> ServiceResult<()> {
        self.owned(comment_id, caller).await?;

        if !self.comments.soft_delete(comment_id).await? {
            return Err(gone("comment"));
        }
        info!(comment_id = %comment_id, "comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::NewTask;
    use crate::services::testing::{board, services, user};

    #[tokio::test]
    async fn test_comment_lifecycle_and_ownership() {
        let services = services();
        let alice = user(&services, "alice").await;
        let bob = user(&services, "bob").await;
        let b = board(&services, alice.id, "B").await;
        let task = services
            .tasks
            .create(
                alice.id,
                NewTask {
                    column_id: b.columns[0].id,
                    title: "t".into(),
                    description: String::new(),
                    deadline: None,
                },
            )
            .await
            .unwrap();

        let comment = services
            .comments
            .create(alice.id, task.id, "first")
            .await
            .unwrap();
        assert_eq!(comment.user_id, alice.id);

        let err = services.comments.find_by_id(comment.id, bob.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(m) if m.contains("comment")));
        let err = services
            .comments
            .create(bob.id, task.id, "sneaky")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let unchanged = services
            .comments
            .update(comment.id, alice.id, Some(String::new()))
            .await
            .unwrap();
        assert_eq!(unchanged.content, "first");

        let edited = services
            .comments
            .update(comment.id, alice.id, Some("edited".into()))
            .await
            .unwrap();
        assert_eq!(edited.content, "edited");

        let listed = services
            .comments
            .find_by_task(task.id, alice.id, Page::default())
            .await
            .unwrap();
        assert_eq!(listed.meta.total, 1);

        services.comments.delete(comment.id, alice.id).await.unwrap();
        let err = services.comments.find_by_id(comment.id, alice.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
