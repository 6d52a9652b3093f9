/// PostgreSQL repositories
///
/// Runtime-checked `sqlx` queries against the schema in `migrations/`. Every
/// read filters `deleted_at IS NULL`; scoped reads join up to `boards` and
/// apply the same filter at each level.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    AttachmentRepository, BoardRepository, ColumnRepository, CommentRepository, LabelRepository,
    PageOf, RefreshTokenRepository, TaskRepository, UserRepository,
};
use crate::error::{map_unique_violation, ServiceResult};
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

const USER_COLUMNS: &str =
    "id, username, email, password_hash, created_at, updated_at, deleted_at";

const BOARD_COLUMNS: &str = "id, user_id, title, color, created_at, updated_at, deleted_at";

const COLUMN_COLUMNS: &str = "id, board_id, title, position, created_at, updated_at, deleted_at";

const TASK_COLUMNS: &str =
    "id, column_id, title, description, deadline, created_at, updated_at, deleted_at";

const COMMENT_COLUMNS: &str = "id, task_id, user_id, content, created_at, updated_at, deleted_at";

const ATTACHMENT_COLUMNS: &str =
    "id, task_id, file_name, file_url, file_size, created_at, updated_at, deleted_at";

const LABEL_COLUMNS: &str = "id, name, color, created_at, updated_at, deleted_at";

/// `column_list` with every name qualified by `alias`
fn qualified(alias: &str, column_list: &str) -> String {
    column_list
        .split(", ")
        .map(|c| format!("{}.{}", alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `%needle%` with LIKE metacharacters escaped
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// `(LIMIT, OFFSET)` for an optional page; `None` fetches everything
fn limit_offset(page: Option<Page>) -> (Option<i64>, i64) {
    match page {
        Some(page) => (Some(page.limit), page.offset()),
        None => (None, 0),
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> ServiceResult<User> {
        let new_user = new_user.before_create()?;

        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let is_username = matches!(
                &e,
                sqlx::Error::Database(db) if db.constraint() == Some("users_username_key")
            );
            if is_username {
                map_unique_violation(e, "username already exists")
            } else {
                map_unique_violation(e, "email already exists")
            }
        })
    }

    async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL
            "#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND deleted_at IS NULL"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id_unscoped(&self, id: Uuid) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

// ---------------------------------------------------------------------------
// Refresh tokens
// ---------------------------------------------------------------------------

pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn create(&self, token: NewRefreshToken) -> ServiceResult<RefreshToken> {
        // Two logins in the same second sign identical tokens; reuse the row.
        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (token) DO UPDATE
            SET expires_at = EXCLUDED.expires_at, deleted_at = NULL, updated_at = NOW()
            RETURNING id, user_id, token, expires_at, created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(token.user_id)
        .bind(&token.token)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_active(&self, token: &str) -> ServiceResult<Option<RefreshToken>> {
        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT id, user_id, token, expires_at, created_at, updated_at, deleted_at
            FROM refresh_tokens
            WHERE token = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn revoke_for_user(&self, user_id: Uuid) -> ServiceResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Boards
// ---------------------------------------------------------------------------

pub struct PgBoardRepository {
    pool: PgPool,
}

impl PgBoardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn live_columns(&self, board_id: Uuid) -> ServiceResult<Vec<Column>> {
        let columns = sqlx::query_as::<_, Column>(&format!(
            r#"
            SELECT {COLUMN_COLUMNS} FROM board_columns
            WHERE board_id = $1 AND deleted_at IS NULL
            ORDER BY position, created_at
            "#
        ))
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(columns)
    }
}

#[async_trait]
impl BoardRepository for PgBoardRepository {
    async fn create_with_columns(
        &self,
        board: NewBoard,
        columns: &[(&str, i32)],
    ) -> ServiceResult<BoardWithColumns> {
        // Dropping `tx` before commit (error or cancelled request) rolls back.
        let mut tx = self.pool.begin().await?;

        let board = sqlx::query_as::<_, Board>(&format!(
            r#"
            INSERT INTO boards (id, user_id, title, color)
            VALUES ($1, $2, $3, $4)
            RETURNING {BOARD_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(board.user_id)
        .bind(&board.title)
        .bind(&board.color)
        .fetch_one(&mut *tx)
        .await?;

        let mut seeded = Vec::with_capacity(columns.len());
        for (title, order) in columns {
            let column = sqlx::query_as::<_, Column>(&format!(
                r#"
                INSERT INTO board_columns (id, board_id, title, position)
                VALUES ($1, $2, $3, $4)
                RETURNING {COLUMN_COLUMNS}
                "#
            ))
            .bind(Uuid::new_v4())
            .bind(board.id)
            .bind(*title)
            .bind(*order)
            .fetch_one(&mut *tx)
            .await?;
            seeded.push(column);
        }

        tx.commit().await?;

        Ok(BoardWithColumns {
            board,
            columns: seeded,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<Board>> {
        let board = sqlx::query_as::<_, Board>(&format!(
            "SELECT {BOARD_COLUMNS} FROM boards WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(board)
    }

    async fn find_with_columns(&self, id: Uuid) -> ServiceResult<Option<BoardWithColumns>> {
        let Some(board) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let columns = self.live_columns(board.id).await?;

        Ok(Some(BoardWithColumns { board, columns }))
    }

    async fn list_by_user(&self, user_id: Uuid, page: Page) -> ServiceResult<PageOf<Board>> {
        let boards = sqlx::query_as::<_, Board>(&format!(
            r#"
            SELECT {BOARD_COLUMNS} FROM boards
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM boards WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((boards, total))
    }

    async fn update(&self, id: Uuid, changes: BoardChanges) -> ServiceResult<Option<Board>> {
        let board = sqlx::query_as::<_, Board>(&format!(
            r#"
            UPDATE boards
            SET title = COALESCE($2, title),
                color = COALESCE($3, color),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {BOARD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.color)
        .fetch_optional(&self.pool)
        .await?;

        Ok(board)
    }

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE boards SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id_unscoped(&self, id: Uuid) -> ServiceResult<Option<Board>> {
        let board = sqlx::query_as::<_, Board>(&format!(
            "SELECT {BOARD_COLUMNS} FROM boards WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(board)
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

pub struct PgColumnRepository {
    pool: PgPool,
}

impl PgColumnRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ColumnRepository for PgColumnRepository {
    async fn create(&self, column: NewColumn) -> ServiceResult<Column> {
        let column = sqlx::query_as::<_, Column>(&format!(
            r#"
            INSERT INTO board_columns (id, board_id, title, position)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMN_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(column.board_id)
        .bind(&column.title)
        .bind(column.order)
        .fetch_one(&self.pool)
        .await?;

        Ok(column)
    }

    async fn find_scoped(&self, id: Uuid) -> ServiceResult<Option<Scoped<Column>>> {
        let row = sqlx::query_as::<_, Scoped<Column>>(&format!(
            r#"
            SELECT {}, b.id AS scope_board_id, b.user_id AS scope_owner_id
            FROM board_columns c
            JOIN boards b ON b.id = c.board_id AND b.deleted_at IS NULL
            WHERE c.id = $1 AND c.deleted_at IS NULL
            "#,
            qualified("c", COLUMN_COLUMNS)
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_by_board(&self, board_id: Uuid) -> ServiceResult<Vec<Column>> {
        let columns = sqlx::query_as::<_, Column>(&format!(
            r#"
            SELECT {COLUMN_COLUMNS} FROM board_columns
            WHERE board_id = $1 AND deleted_at IS NULL
            ORDER BY position, created_at
            "#
        ))
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(columns)
    }

    async fn next_order(&self, board_id: Uuid) -> ServiceResult<i32> {
        let max: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(position) FROM board_columns WHERE board_id = $1 AND deleted_at IS NULL",
        )
        .bind(board_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(max.map_or(1, |m| m.saturating_add(1)))
    }

    async fn update(&self, id: Uuid, changes: ColumnChanges) -> ServiceResult<Option<Column>> {
        let column = sqlx::query_as::<_, Column>(&format!(
            r#"
            UPDATE board_columns
            SET title = COALESCE($2, title),
                position = COALESCE($3, position),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {COLUMN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.order)
        .fetch_optional(&self.pool)
        .await?;

        Ok(column)
    }

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE board_columns SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, task: NewTask) -> ServiceResult<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (id, column_id, title, description, deadline)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(task.column_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.deadline)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn find_scoped(&self, id: Uuid) -> ServiceResult<Option<Scoped<Task>>> {
        let row = sqlx::query_as::<_, Scoped<Task>>(&format!(
            r#"
            SELECT {}, b.id AS scope_board_id, b.user_id AS scope_owner_id
            FROM tasks t
            JOIN board_columns c ON c.id = t.column_id AND c.deleted_at IS NULL
            JOIN boards b ON b.id = c.board_id AND b.deleted_at IS NULL
            WHERE t.id = $1 AND t.deleted_at IS NULL
            "#,
            qualified("t", TASK_COLUMNS)
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_by_column(
        &self,
        column_id: Uuid,
        title: Option<&str>,
        page: Page,
    ) -> ServiceResult<PageOf<Task>> {
        let pattern = title.map(like_pattern);

        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS} FROM tasks
            WHERE column_id = $1 AND deleted_at IS NULL
              AND ($2::TEXT IS NULL OR title ILIKE $2)
            ORDER BY created_at, id
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(column_id)
        .bind(pattern.as_deref())
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tasks
            WHERE column_id = $1 AND deleted_at IS NULL
              AND ($2::TEXT IS NULL OR title ILIKE $2)
            "#,
        )
        .bind(column_id)
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((tasks, total))
    }

    async fn search_in_board(
        &self,
        board_id: Uuid,
        keyword: &str,
        page: Page,
    ) -> ServiceResult<PageOf<Task>> {
        let pattern = like_pattern(keyword);

        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {} FROM tasks t
            JOIN board_columns c ON c.id = t.column_id AND c.deleted_at IS NULL
            WHERE c.board_id = $1 AND t.deleted_at IS NULL
              AND (t.title ILIKE $2 OR t.description ILIKE $2)
            ORDER BY t.created_at, t.id
            LIMIT $3 OFFSET $4
            "#,
            qualified("t", TASK_COLUMNS)
        ))
        .bind(board_id)
        .bind(&pattern)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tasks t
            JOIN board_columns c ON c.id = t.column_id AND c.deleted_at IS NULL
            WHERE c.board_id = $1 AND t.deleted_at IS NULL
              AND (t.title ILIKE $2 OR t.description ILIKE $2)
            "#,
        )
        .bind(board_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((tasks, total))
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> ServiceResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                deadline = CASE WHEN $4 THEN $5 ELSE deadline END,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.deadline.is_some())
        .bind(changes.deadline.flatten())
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn move_to_column(&self, id: Uuid, column_id: Uuid) -> ServiceResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks SET column_id = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(column_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tasks SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id_unscoped(&self, id: Uuid) -> ServiceResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, comment: NewComment) -> ServiceResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (id, task_id, user_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(comment.task_id)
        .bind(comment.user_id)
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn find_scoped(&self, id: Uuid) -> ServiceResult<Option<Scoped<Comment>>> {
        let row = sqlx::query_as::<_, Scoped<Comment>>(&format!(
            r#"
            SELECT {}, b.id AS scope_board_id, b.user_id AS scope_owner_id
            FROM comments cm
            JOIN tasks t ON t.id = cm.task_id AND t.deleted_at IS NULL
            JOIN board_columns c ON c.id = t.column_id AND c.deleted_at IS NULL
            JOIN boards b ON b.id = c.board_id AND b.deleted_at IS NULL
            WHERE cm.id = $1 AND cm.deleted_at IS NULL
            "#,
            qualified("cm", COMMENT_COLUMNS)
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_by_task(
        &self,
        task_id: Uuid,
        page: Option<Page>,
    ) -> ServiceResult<PageOf<Comment>> {
        let (limit, offset) = limit_offset(page);

        let comments = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS} FROM comments
            WHERE task_id = $1 AND deleted_at IS NULL
            ORDER BY created_at, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(task_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comments WHERE task_id = $1 AND deleted_at IS NULL",
        )
        .bind(task_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((comments, total))
    }

    async fn update(&self, id: Uuid, content: String) -> ServiceResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments SET content = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE comments SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

pub struct PgAttachmentRepository {
    pool: PgPool,
}

impl PgAttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    async fn create(&self, attachment: NewAttachment) -> ServiceResult<Attachment> {
        let attachment = sqlx::query_as::<_, Attachment>(&format!(
            r#"
            INSERT INTO attachments (id, task_id, file_name, file_url, file_size)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ATTACHMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(attachment.task_id)
        .bind(&attachment.file_name)
        .bind(&attachment.file_url)
        .bind(attachment.file_size)
        .fetch_one(&self.pool)
        .await?;

        Ok(attachment)
    }

    async fn find_scoped(&self, id: Uuid) -> ServiceResult<Option<Scoped<Attachment>>> {
        let row = sqlx::query_as::<_, Scoped<Attachment>>(&format!(
            r#"
            SELECT {}, b.id AS scope_board_id, b.user_id AS scope_owner_id
            FROM attachments a
            JOIN tasks t ON t.id = a.task_id AND t.deleted_at IS NULL
            JOIN board_columns c ON c.id = t.column_id AND c.deleted_at IS NULL
            JOIN boards b ON b.id = c.board_id AND b.deleted_at IS NULL
            WHERE a.id = $1 AND a.deleted_at IS NULL
            "#,
            qualified("a", ATTACHMENT_COLUMNS)
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_by_task(
        &self,
        task_id: Uuid,
        page: Option<Page>,
    ) -> ServiceResult<PageOf<Attachment>> {
        let (limit, offset) = limit_offset(page);

        let attachments = sqlx::query_as::<_, Attachment>(&format!(
            r#"
            SELECT {ATTACHMENT_COLUMNS} FROM attachments
            WHERE task_id = $1 AND deleted_at IS NULL
            ORDER BY created_at, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(task_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM attachments WHERE task_id = $1 AND deleted_at IS NULL",
        )
        .bind(task_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((attachments, total))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: AttachmentChanges,
    ) -> ServiceResult<Option<Attachment>> {
        let attachment = sqlx::query_as::<_, Attachment>(&format!(
            r#"
            UPDATE attachments
            SET file_name = COALESCE($2, file_name),
                file_url = COALESCE($3, file_url),
                file_size = COALESCE($4, file_size),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {ATTACHMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.file_name)
        .bind(changes.file_url)
        .bind(changes.file_size)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attachment)
    }

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE attachments SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

pub struct PgLabelRepository {
    pool: PgPool,
}

impl PgLabelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LabelRepository for PgLabelRepository {
    async fn create(&self, label: NewLabel) -> ServiceResult<Label> {
        sqlx::query_as::<_, Label>(&format!(
            r#"
            INSERT INTO labels (id, name, color)
            VALUES ($1, $2, $3)
            RETURNING {LABEL_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&label.name)
        .bind(&label.color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "label name already exists"))
    }

    async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<Label>> {
        let label = sqlx::query_as::<_, Label>(&format!(
            "SELECT {LABEL_COLUMNS} FROM labels WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(label)
    }

    async fn list(&self, page: Page) -> ServiceResult<PageOf<Label>> {
        let labels = sqlx::query_as::<_, Label>(&format!(
            r#"
            SELECT {LABEL_COLUMNS} FROM labels
            WHERE deleted_at IS NULL
            ORDER BY name, id
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM labels WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;

        Ok((labels, total))
    }

    async fn update(&self, id: Uuid, changes: LabelChanges) -> ServiceResult<Option<Label>> {
        sqlx::query_as::<_, Label>(&format!(
            r#"
            UPDATE labels
            SET name = COALESCE($2, name),
                color = COALESCE($3, color),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {LABEL_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.color)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "label name already exists"))
    }

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE labels SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn attach(&self, task_id: Uuid, label_id: Uuid) -> ServiceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO task_labels (task_id, label_id)
            VALUES ($1, $2)
            ON CONFLICT (task_id, label_id) DO NOTHING
            "#,
        )
        .bind(task_id)
        .bind(label_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn detach(&self, task_id: Uuid, label_id: Uuid) -> ServiceResult<()> {
        sqlx::query("DELETE FROM task_labels WHERE task_id = $1 AND label_id = $2")
            .bind(task_id)
            .bind(label_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_for_task(&self, task_id: Uuid) -> ServiceResult<Vec<Label>> {
        let labels = sqlx::query_as::<_, Label>(&format!(
            r#"
            SELECT {} FROM labels l
            JOIN task_labels tl ON tl.label_id = l.id
            WHERE tl.task_id = $1 AND l.deleted_at IS NULL
            ORDER BY l.name
            "#,
            qualified("l", LABEL_COLUMNS)
        ))
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(labels)
    }
}
