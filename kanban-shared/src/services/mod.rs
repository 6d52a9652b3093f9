/// Domain services
///
/// Each service resolves the entity a request refers to, walks it up to its
/// board, checks the caller owns that board and only then touches the
/// repositories. Labels are the exception: they are global, so only their
/// task associations are ownership-checked.
///
/// Services return [`ServiceError`](crate::error::ServiceError) variants
/// exclusively; the HTTP layer maps them to status codes by variant.
///
/// # Example
///
/// ```no_run
/// use kanban_shared::auth::jwt::JwtKeys;
/// use kanban_shared::repositories::Repositories;
/// use kanban_shared::services::Services;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), kanban_shared::error::ServiceError> {
/// let services = Services::new(Repositories::postgres(pool), JwtKeys::new("secret"));
/// let user = services
///     .auth
///     .register("u", "u@e.com", "password1")
///     .await?;
/// let board = services.boards.create(user.id, "B", "#f00").await?;
/// assert_eq!(board.columns.len(), 3);
/// # Ok(())
/// # }
/// ```

use uuid::Uuid;

use crate::auth::{authorization::require_owner, jwt::JwtKeys};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{board::Board, column::Column, task::Task, Scoped};
use crate::repositories::{BoardRepository, ColumnRepository, Repositories, TaskRepository};

pub mod attachment;
pub mod auth;
pub mod board;
pub mod column;
pub mod comment;
pub mod label;
pub mod task;

pub use attachment::AttachmentService;
pub use auth::AuthService;
pub use board::BoardService;
pub use column::ColumnService;
pub use comment::CommentService;
pub use label::LabelService;
pub use task::TaskService;

/// Every service, built once at startup and shared through the app state
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub boards: BoardService,
    pub columns: ColumnService,
    pub tasks: TaskService,
    pub comments: CommentService,
    pub attachments: AttachmentService,
    pub labels: LabelService,
}

impl Services {
    pub fn new(repos: Repositories, keys: JwtKeys) -> Self {
        Self {
            auth: AuthService::new(repos.users.clone(), repos.refresh_tokens.clone(), keys),
            boards: BoardService::new(repos.boards.clone()),
            columns: ColumnService::new(repos.boards.clone(), repos.columns.clone()),
            tasks: TaskService::new(&repos),
            comments: CommentService::new(repos.tasks.clone(), repos.comments.clone()),
            attachments: AttachmentService::new(repos.tasks.clone(), repos.attachments.clone()),
            labels: LabelService::new(repos.tasks.clone(), repos.labels.clone()),
        }
    }
}

/// Live board owned by `caller`
pub(crate) async fn owned_board(
    boards: &dyn BoardRepository,
    caller: Uuid,
    board_id: Uuid,
) -> ServiceResult<Board> {
    let board = boards
        .find_by_id(board_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("board not found"))?;
    require_owner(caller, board)
}

/// Live column whose board is owned by `caller`
pub(crate) async fn owned_column(
    columns: &dyn ColumnRepository,
    caller: Uuid,
    column_id: Uuid,
) -> ServiceResult<Scoped<Column>> {
    let column = columns
        .find_scoped(column_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("column not found"))?;
    require_owner(caller, column)
}

/// Live task whose board is owned by `caller`
pub(crate) async fn owned_task(
    tasks: &dyn TaskRepository,
    caller: Uuid,
    task_id: Uuid,
) -> ServiceResult<Scoped<Task>> {
    let task = tasks
        .find_scoped(task_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("task not found"))?;
    require_owner(caller, task)
}

/// Row vanished between the ownership check and the write
pub(crate) fn gone(kind: &str) -> ServiceError {
    ServiceError::not_found(format!("{} not found", kind))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::models::{board::BoardWithColumns, user::User};

    /// Services over a fresh in-memory store
    pub fn services() -> Services {
        Services::new(Repositories::in_memory(), JwtKeys::new("service-test-secret"))
    }

    pub async fn user(services: &Services, name: &str) -> User {
        services
            .auth
            .register(name, &format!("{}@example.com", name), "password1")
            .await
            .unwrap()
    }

    pub async fn board(services: &Services, owner: Uuid, title: &str) -> BoardWithColumns {
        services.boards.create(owner, title, "#fff").await.unwrap()
    }
}
