/// Data access
///
/// One trait per entity kind. Services only ever see `Arc<dyn ...>` handles
/// collected in [`Repositories`], so the PostgreSQL implementation
/// ([`postgres`]) and the in-memory one ([`memory`], behind the `testing`
/// feature) are interchangeable.
///
/// # Conventions
///
/// - `find_*` return `Ok(None)` for missing *and* soft-deleted rows.
/// - `find_scoped` loads the entity joined up to its board and fails to
///   match when any level of the chain is soft-deleted.
/// - `update` and `move_*` return `Ok(None)` when the row vanished between the
///   service's ownership check and the write.
/// - `soft_delete` returns whether a live row was tombstoned.
/// - List methods return `(rows, total)` where `total` ignores the page.
/// - Uniqueness violations come back as `ServiceError::Conflict`.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::models::{
    attachment::{Attachment, AttachmentChanges, NewAttachment},
    board::{Board, BoardChanges, BoardWithColumns, NewBoard},
    column::{Column, ColumnChanges, NewColumn},
    comment::{Comment, NewComment},
    label::{Label, LabelChanges, NewLabel},
    refresh_token::{NewRefreshToken, RefreshToken},
    task::{NewTask, Task, TaskChanges},
    user::{NewUser, User},
    Scoped,
};
use crate::pagination::Page;

#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod postgres;

/// Rows of one page plus the total row count
pub type PageOf<T> = (Vec<T>, i64);

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Runs [`NewUser::before_create`], then inserts
    async fn create(&self, new_user: NewUser) -> ServiceResult<User>;

    async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<User>>;

    /// Case-insensitive
    async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>>;

    /// Includes soft-deleted users. Administrative use only.
    async fn find_by_id_unscoped(&self, id: Uuid) -> ServiceResult<Option<User>>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, token: NewRefreshToken) -> ServiceResult<RefreshToken>;

    /// Live (not revoked) row for `token`; expiry is checked by the caller
    async fn find_active(&self, token: &str) -> ServiceResult<Option<RefreshToken>>;

    /// Revokes every live token of `user_id`, returning how many
    async fn revoke_for_user(&self, user_id: Uuid) -> ServiceResult<u64>;
}

#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Inserts the board and `columns` (`(title, order)`) atomically
    async fn create_with_columns(
        &self,
        board: NewBoard,
        columns: &[(&str, i32)],
    ) -> ServiceResult<BoardWithColumns>;

    async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<Board>>;

    async fn find_with_columns(&self, id: Uuid) -> ServiceResult<Option<BoardWithColumns>>;

    /// Newest first
    async fn list_by_user(&self, user_id: Uuid, page: Page) -> ServiceResult<PageOf<Board>>;

    async fn update(&self, id: Uuid, changes: BoardChanges) -> ServiceResult<Option<Board>>;

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool>;

    /// Includes soft-deleted boards. Administrative use only.
    async fn find_by_id_unscoped(&self, id: Uuid) -> ServiceResult<Option<Board>>;
}

#[async_trait]
pub trait ColumnRepository: Send + Sync {
    async fn create(&self, column: NewColumn) -> ServiceResult<Column>;

    async fn find_scoped(&self, id: Uuid) -> ServiceResult<Option<Scoped<Column>>>;

    /// Ordered by `order`, then creation time
    async fn list_by_board(&self, board_id: Uuid) -> ServiceResult<Vec<Column>>;

    /// One past the highest live `order` on the board (1 for an empty board)
    async fn next_order(&self, board_id: Uuid) -> ServiceResult<i32>;

    async fn update(&self, id: Uuid, changes: ColumnChanges) -> ServiceResult<Option<Column>>;

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: NewTask) -> ServiceResult<Task>;

    async fn find_scoped(&self, id: Uuid) -> ServiceResult<Option<Scoped<Task>>>;

    /// Oldest first; `title` filters by case-insensitive substring
    async fn list_by_column(
        &self,
        column_id: Uuid,
        title: Option<&str>,
        page: Page,
    ) -> ServiceResult<PageOf<Task>>;

    /// Case-insensitive substring match on title or description across the
    /// board's live columns
    async fn search_in_board(
        &self,
        board_id: Uuid,
        keyword: &str,
        page: Page,
    ) -> ServiceResult<PageOf<Task>>;

    async fn update(&self, id: Uuid, changes: TaskChanges) -> ServiceResult<Option<Task>>;

    /// Rewrites `column_id` only
    async fn move_to_column(&self, id: Uuid, column_id: Uuid) -> ServiceResult<Option<Task>>;

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool>;

    /// Includes soft-deleted tasks. Administrative use only.
    async fn find_by_id_unscoped(&self, id: Uuid) -> ServiceResult<Option<Task>>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> ServiceResult<Comment>;

    async fn find_scoped(&self, id: Uuid) -> ServiceResult<Option<Scoped<Comment>>>;

    /// Oldest first; `None` returns every comment
    async fn list_by_task(&self, task_id: Uuid, page: Option<Page>)
        -> ServiceResult<PageOf<Comment>>;

    async fn update(&self, id: Uuid, content: String) -> ServiceResult<Option<Comment>>;

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool>;
}

#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    async fn create(&self, attachment: NewAttachment) -> ServiceResult<Attachment>;

    async fn find_scoped(&self, id: Uuid) -> ServiceResult<Option<Scoped<Attachment>>>;

    /// Oldest first; `None` returns every attachment
    async fn list_by_task(
        &self,
        task_id: Uuid,
        page: Option<Page>,
    ) -> ServiceResult<PageOf<Attachment>>;

    async fn update(
        &self,
        id: Uuid,
        changes: AttachmentChanges,
    ) -> ServiceResult<Option<Attachment>>;

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool>;
}

#[async_trait]
pub trait LabelRepository: Send + Sync {
    async fn create(&self, label: NewLabel) -> ServiceResult<Label>;

    async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<Label>>;

    /// Ordered by name
    async fn list(&self, page: Page) -> ServiceResult<PageOf<Label>>;

    async fn update(&self, id: Uuid, changes: LabelChanges) -> ServiceResult<Option<Label>>;

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool>;

    /// No-op if the association exists
    async fn attach(&self, task_id: Uuid, label_id: Uuid) -> ServiceResult<()>;

    /// No-op if the association does not exist
    async fn detach(&self, task_id: Uuid, label_id: Uuid) -> ServiceResult<()>;

    /// Live labels attached to `task_id`, ordered by name
    async fn list_for_task(&self, task_id: Uuid) -> ServiceResult<Vec<Label>>;
}

/// Every repository the services need
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub boards: Arc<dyn BoardRepository>,
    pub columns: Arc<dyn ColumnRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub attachments: Arc<dyn AttachmentRepository>,
    pub labels: Arc<dyn LabelRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
            refresh_tokens: Arc::new(postgres::PgRefreshTokenRepository::new(pool.clone())),
            boards: Arc::new(postgres::PgBoardRepository::new(pool.clone())),
            columns: Arc::new(postgres::PgColumnRepository::new(pool.clone())),
            tasks: Arc::new(postgres::PgTaskRepository::new(pool.clone())),
            comments: Arc::new(postgres::PgCommentRepository::new(pool.clone())),
            attachments: Arc::new(postgres::PgAttachmentRepository::new(pool.clone())),
            labels: Arc::new(postgres::PgLabelRepository::new(pool)),
        }
    }

    /// Repositories over one fresh [`memory::MemoryStore`]
    #[cfg(any(test, feature = "testing"))]
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            users: store.clone(),
            refresh_tokens: store.clone(),
            boards: store.clone(),
            columns: store.clone(),
            tasks: store.clone(),
            comments: store.clone(),
            attachments: store.clone(),
            labels: store,
        }
    }
}
