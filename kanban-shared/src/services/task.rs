/// Tasks: CRUD, filtered listing, board-wide search and moves
///
/// # Moves
///
/// A task may only move between columns of the same board. Both the task
/// and the target column must belong to the caller; a target column on
/// another board is rejected with a validation error even when the caller
/// owns both boards.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{gone, owned_board, owned_column, owned_task};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    non_empty,
    task::{NewTask, Task, TaskChanges, TaskDetails},
};
use crate::pagination::{Page, Paginated};
use crate::repositories::{
    AttachmentRepository, BoardRepository, ColumnRepository, CommentRepository, LabelRepository,
    Repositories, TaskRepository,
};
use crate::validation::required;

pub const CROSS_BOARD_MOVE: &str = "cannot move task to a column in a different board";

#[derive(Clone)]
pub struct TaskService {
    boards: Arc<dyn BoardRepository>,
    columns: Arc<dyn ColumnRepository>,
    tasks: Arc<dyn TaskRepository>,
    comments: Arc<dyn CommentRepository>,
    attachments: Arc<dyn AttachmentRepository>,
    labels: Arc<dyn LabelRepository>,
}

impl TaskService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            boards: repos.boards.clone(),
            columns: repos.columns.clone(),
            tasks: repos.tasks.clone(),
            comments: repos.comments.clone(),
            attachments: repos.attachments.clone(),
            labels: repos.labels.clone(),
        }
    }

    /// Creates a task in a column the caller owns
    pub async fn create(&self, caller: Uuid, task: NewTask) -> ServiceResult<Task> {
        let task = NewTask {
            title: required("title", &task.title)?,
            ..task
        };
        owned_column(self.columns.as_ref(), caller, task.column_id).await?;

        let task = self.tasks.create(task).await?;
        info!(task_id = %task.id, column_id = %task.column_id, "task created");
        Ok(task)
    }

    pub async fn find_by_id(&self, task_id: Uuid, caller: Uuid) -> ServiceResult<Task> {
        Ok(owned_task(self.tasks.as_ref(), caller, task_id)
            .await?
            .into_inner())
    }

    /// The task with its labels, comments and attachments
    pub async fn details(&self, task_id: Uuid, caller: Uuid) -> ServiceResult<TaskDetails> {
        let task = self.find_by_id(task_id, caller).await?;

        let labels = self.labels.list_for_task(task_id).await?;
        let (comments, _) = self.comments.list_by_task(task_id, None).await?;
        let (attachments, _) = self.attachments.list_by_task(task_id, None).await?;

        Ok(TaskDetails {
            task,
            labels,
            comments,
            attachments,
        })
    }

    pub async fn find_by_column(
        &self,
        column_id: Uuid,
        caller: Uuid,
        page: Page,
    ) -> ServiceResult<Paginated<Task>> {
        self.find_by_column_with_filters(column_id, caller, None, page)
            .await
    }

    /// `title` filters by case-insensitive substring; empty means no filter
    pub async fn find_by_column_with_filters(
        &self,
        column_id: Uuid,
        caller: Uuid,
        title: Option<&str>,
        page: Page,
    ) -> ServiceResult<Paginated<Task>> {
        owned_column(self.columns.as_ref(), caller, column_id).await?;

        let title = title.map(str::trim).filter(|t| !t.is_empty());
        let (tasks, total) = self.tasks.list_by_column(column_id, title, page).await?;
        Ok(Paginated::new(tasks, page, total))
    }

    /// Empty `title` leaves it unchanged; see [`TaskChanges`] for the rest
    pub async fn update(
        &self,
        task_id: Uuid,
        caller: Uuid,
        changes: TaskChanges,
    ) -> ServiceResult<Task> {
        owned_task(self.tasks.as_ref(), caller, task_id).await?;

        let changes = TaskChanges {
            title: non_empty(changes.title),
            ..changes
        };
        let task = self
            .tasks
            .update(task_id, changes)
            .await?
            .ok_or_else(|| gone("task"))?;

        info!(task_id = %task_id, "task updated");
        Ok(task)
    }

    pub async fn delete(&self, task_id: Uuid, caller: Uuid) -> ServiceResult<()> {
        owned_task(self.tasks.as_ref(), caller, task_id).await?;

        if !self.tasks.soft_delete(task_id).await? {
            return Err(gone("task"));
        }
        info!(task_id = %task_id, "task deleted");
        Ok(())
    }

    /// Moves a task to another column of the same board
    pub async fn move_task(
        &self,
        task_id: Uuid,
        target_column_id: Uuid,
        caller: Uuid,
    ) -> ServiceResult<Task> {
        let task = owned_task(self.tasks.as_ref(), caller, task_id).await?;
        let target = owned_column(self.columns.as_ref(), caller, target_column_id).await?;

        if task.board_id != target.board_id {
            return Err(ServiceError::validation(CROSS_BOARD_MOVE));
        }

        let moved = self
            .tasks
            .move_to_column(task_id, target_column_id)
            .await?
            .ok_or_else(|| gone("task"))?;

        info!(
            task_id = %task_id,
            from = %task.entity.column_id,
            to = %target_column_id,
            "task moved"
        );
        Ok(moved)
    }

    /// Substring search over title and description within one board
    pub async fn search(
        &self,
        board_id: Uuid,
        caller: Uuid,
        keyword: &str,
        page: Page,
    ) -> ServiceResult<Paginated<Task>> {
        owned_board(self.boards.as_ref(), caller, board_id).await?;

        let (tasks, total) = self
            .tasks
            .search_in_board(board_id, keyword.trim(), page)
            .await?;
        Ok(Paginated::new(tasks, page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::board::BoardWithColumns;
    use crate::services::{
        testing::{board, services, user},
        Services,
    };
    use chrono::{TimeZone, Utc};

    async fn task_in(services: &Services, owner: Uuid, column_id: Uuid, title: &str) -> Task {
        services
            .tasks
            .create(
                owner,
                NewTask {
                    column_id,
                    title: title.into(),
                    description: String::new(),
                    deadline: None,
                },
            )
            .await
            .unwrap()
    }

    fn first_column(board: &BoardWithColumns) -> Uuid {
        board.columns[0].id
    }

    #[tokio::test]
    async fn test_move_within_board() {
        let services = services();
        let u = user(&services, "alice").await;
        let b = board(&services, u.id, "B").await;
        let t = task_in(&services, u.id, first_column(&b), "t").await;

        let moved = services
            .tasks
            .move_task(t.id, b.columns[2].id, u.id)
            .await
            .unwrap();
        assert_eq!(moved.column_id, b.columns[2].id);
        assert_eq!(moved.title, "t");
    }

    #[tokio::test]
    async fn test_cross_board_move_rejected() {
        let services = services();
        let u = user(&services, "alice").await;
        let b1 = board(&services, u.id, "B1").await;
        let b2 = board(&services, u.id, "B2").await;
        let t = task_in(&services, u.id, first_column(&b1), "t").await;

        let err = services
            .tasks
            .move_task(t.id, first_column(&b2), u.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref message, .. } if message.contains("different board")));

        let unchanged = services.tasks.find_by_id(t.id, u.id).await.unwrap();
        assert_eq!(unchanged.column_id, first_column(&b1));
    }

    #[tokio::test]
    async fn test_move_into_foreign_column_denied() {
        let services = services();
        let alice = user(&services, "alice").await;
        let bob = user(&services, "bob").await;
        let mine = board(&services, alice.id, "mine").await;
        let theirs = board(&services, bob.id, "theirs").await;
        let t = task_in(&services, alice.id, first_column(&mine), "t").await;

        let err = services
            .tasks
            .move_task(t.id, first_column(&theirs), alice.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_create_in_foreign_column_denied() {
        let services = services();
        let alice = user(&services, "alice").await;
        let bob = user(&services, "bob").await;
        let b = board(&services, alice.id, "B").await;

        let err = services
            .tasks
            .create(
                bob.id,
                NewTask {
                    column_id: first_column(&b),
                    title: "t".into(),
                    description: String::new(),
                    deadline: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_update_partial_fields() {
        let services = services();
        let u = user(&services, "alice").await;
        let b = board(&services, u.id, "B").await;
        let t = task_in(&services, u.id, first_column(&b), "t").await;
        let deadline = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        let updated = services
            .tasks
            .update(
                t.id,
                u.id,
                TaskChanges {
                    title: Some(String::new()),
                    description: Some("details".into()),
                    deadline: Some(Some(deadline)),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "t");
        assert_eq!(updated.description, "details");
        assert_eq!(updated.deadline, Some(deadline));

        let cleared = services
            .tasks
            .update(
                t.id,
                u.id,
                TaskChanges {
                    deadline: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.deadline, None);
        assert_eq!(cleared.description, "details");
    }

    #[tokio::test]
    async fn test_filter_and_search() {
        let services = services();
        let u = user(&services, "alice").await;
        let b = board(&services, u.id, "B").await;
        let col = first_column(&b);
        task_in(&services, u.id, col, "Write docs").await;
        task_in(&services, u.id, col, "Fix bug").await;
        task_in(&services, u.id, b.columns[1].id, "Review DOCS").await;

        let filtered = services
            .tasks
            .find_by_column_with_filters(col, u.id, Some("DOC"), Page::default())
            .await
            .unwrap();
        assert_eq!(filtered.items.len(), 1);
        assert_eq!(filtered.meta.total, 1);

        let all = services
            .tasks
            .find_by_column(col, u.id, Page::default())
            .await
            .unwrap();
        assert_eq!(all.meta.total, 2);

        let found = services
            .tasks
            .search(b.board.id, u.id, "docs", Page::default())
            .await
            .unwrap();
        assert_eq!(found.meta.total, 2);
    }

    #[tokio::test]
    async fn test_delete_then_find_is_not_found() {
        let services = services();
        let u = user(&services, "alice").await;
        let b = board(&services, u.id, "B").await;
        let t = task_in(&services, u.id, first_column(&b), "t").await;

        services.tasks.delete(t.id, u.id).await.unwrap();
        let err = services.tasks.find_by_id(t.id, u.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_tasks_hidden_after_board_delete() {
        let services = services();
        let u = user(&services, "alice").await;
        let b = board(&services, u.id, "B").await;
        let t = task_in(&services, u.id, first_column(&b), "t").await;

        services.boards.delete(b.board.id, u.id).await.unwrap();
        let err = services.tasks.find_by_id(t.id, u.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
