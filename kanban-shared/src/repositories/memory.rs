/// In-memory repositories
///
/// A single [`MemoryStore`] implements every repository trait over plain
/// vectors behind one `RwLock`. It mirrors the PostgreSQL semantics the
/// services rely on: soft-delete filtering at every level of the ownership
/// walk, partial-unique constraints, idempotent label attach and atomic board
/// creation. Used by unit tests and by the API crate's HTTP tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AttachmentRepository, BoardRepository, ColumnRepository, CommentRepository, LabelRepository,
    PageOf, RefreshTokenRepository, TaskRepository, UserRepository,
};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    attachment::{Attachment, AttachmentChanges, NewAttachment},
    board::{Board, BoardChanges, BoardWithColumns, NewBoard},
    column::{sort_columns, Column, ColumnChanges, NewColumn},
    comment::{Comment, NewComment},
    label::{Label, LabelChanges, NewLabel},
    refresh_token::{NewRefreshToken, RefreshToken},
    task::{NewTask, Task, TaskChanges},
    user::{NewUser, User},
    Scoped,
};
use crate::pagination::Page;

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    refresh_tokens: Vec<RefreshToken>,
    boards: Vec<Board>,
    columns: Vec<Column>,
    tasks: Vec<Task>,
    comments: Vec<Comment>,
    attachments: Vec<Attachment>,
    labels: Vec<Label>,
    task_labels: Vec<(Uuid, Uuid)>,
}

impl State {
    fn live_board(&self, id: Uuid) -> Option<&Board> {
        self.boards
            .iter()
            .find(|b| b.id == id && b.deleted_at.is_none())
    }

    /// `(board_id, owner_id)` of a live column under a live board
    fn column_scope(&self, column_id: Uuid) -> Option<(Uuid, Uuid)> {
        let column = self
            .columns
            .iter()
            .find(|c| c.id == column_id && c.deleted_at.is_none())?;
        let board = self.live_board(column.board_id)?;
        Some((board.id, board.user_id))
    }

    fn task_scope(&self, task_id: Uuid) -> Option<(Uuid, Uuid)> {
        let task = self
            .tasks
            .iter()
            .find(|t| t.id == task_id && t.deleted_at.is_none())?;
        self.column_scope(task.column_id)
    }

    fn label_name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.labels
            .iter()
            .any(|l| l.deleted_at.is_none() && l.name == name && Some(l.id) != except)
    }
}

fn page_of<T: Clone>(items: Vec<T>, page: Option<Page>) -> PageOf<T> {
    let total = i64::try_from(items.len()).unwrap_or(i64::MAX);
    let items = match page {
        Some(page) => page.slice(&items),
        None => items,
    };
    (items, total)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new_user: NewUser) -> ServiceResult<User> {
        let new_user = new_user.before_create()?;
        let mut state = self.state.write().await;

        let live = state.users.iter().filter(|u| u.deleted_at.is_none());
        for user in live {
            if user.email.eq_ignore_ascii_case(&new_user.email) {
                return Err(ServiceError::conflict("email already exists"));
            }
            if user.username == new_user.username {
                return Err(ServiceError::conflict("username already exists"));
            }
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email) && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.username == username && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_id_unscoped(&self, id: Uuid) -> ServiceResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Refresh tokens
// ---------------------------------------------------------------------------

#[async_trait]
impl RefreshTokenRepository for MemoryStore {
    async fn create(&self, token: NewRefreshToken) -> ServiceResult<RefreshToken> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        if let Some(existing) = state
            .refresh_tokens
            .iter_mut()
            .find(|t| t.token == token.token)
        {
            existing.expires_at = token.expires_at;
            existing.deleted_at = None;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let row = RefreshToken {
            id: Uuid::new_v4(),
            user_id: token.user_id,
            token: token.token,
            expires_at: token.expires_at,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.refresh_tokens.push(row.clone());
        Ok(row)
    }

    async fn find_active(&self, token: &str) -> ServiceResult<Option<RefreshToken>> {
        let state = self.state.read().await;
        Ok(state
            .refresh_tokens
            .iter()
            .find(|t| t.token == token && t.deleted_at.is_none())
            .cloned())
    }

    async fn revoke_for_user(&self, user_id: Uuid) -> ServiceResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut revoked = 0;
        for token in state
            .refresh_tokens
            .iter_mut()
            .filter(|t| t.user_id == user_id && t.deleted_at.is_none())
        {
            token.deleted_at = Some(now);
            token.updated_at = now;
            revoked += 1;
        }
        Ok(revoked)
    }
}

// ---------------------------------------------------------------------------
// Boards
// ---------------------------------------------------------------------------

#[async_trait]
impl BoardRepository for MemoryStore {
    async fn create_with_columns(
        &self,
        board: NewBoard,
        columns: &[(&str, i32)],
    ) -> ServiceResult<BoardWithColumns> {
        // One write guard for both inserts: readers never see a board without
        // its columns.
        let mut state = self.state.write().await;
        let now = Utc::now();

        let board = Board {
            id: Uuid::new_v4(),
            user_id: board.user_id,
            title: board.title,
            color: board.color,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let seeded: Vec<Column> = columns
            .iter()
            .map(|(title, order)| Column {
                id: Uuid::new_v4(),
                board_id: board.id,
                title: (*title).to_string(),
                order: *order,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            })
            .collect();

        state.boards.push(board.clone());
        state.columns.extend(seeded.iter().cloned());

        Ok(BoardWithColumns {
            board,
            columns: seeded,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<Board>> {
        let state = self.state.read().await;
        Ok(state.live_board(id).cloned())
    }

    async fn find_with_columns(&self, id: Uuid) -> ServiceResult<Option<BoardWithColumns>> {
        let state = self.state.read().await;
        let Some(board) = state.live_board(id).cloned() else {
            return Ok(None);
        };
        let mut columns: Vec<Column> = state
            .columns
            .iter()
            .filter(|c| c.board_id == id && c.deleted_at.is_none())
            .cloned()
            .collect();
        sort_columns(&mut columns);

        Ok(Some(BoardWithColumns { board, columns }))
    }

    async fn list_by_user(&self, user_id: Uuid, page: Page) -> ServiceResult<PageOf<Board>> {
        let state = self.state.read().await;
        let mut boards: Vec<Board> = state
            .boards
            .iter()
            .filter(|b| b.user_id == user_id && b.deleted_at.is_none())
            .cloned()
            .collect();
        boards.reverse();
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(page_of(boards, Some(page)))
    }

    async fn update(&self, id: Uuid, changes: BoardChanges) -> ServiceResult<Option<Board>> {
        let mut state = self.state.write().await;
        let Some(board) = state
            .boards
            .iter_mut()
            .find(|b| b.id == id && b.deleted_at.is_none())
        else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            board.title = title;
        }
        if let Some(color) = changes.color {
            board.color = color;
        }
        board.updated_at = Utc::now();
        Ok(Some(board.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        match state
            .boards
            .iter_mut()
            .find(|b| b.id == id && b.deleted_at.is_none())
        {
            Some(board) => {
                board.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_id_unscoped(&self, id: Uuid) -> ServiceResult<Option<Board>> {
        let state = self.state.read().await;
        Ok(state.boards.iter().find(|b| b.id == id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

#[async_trait]
impl ColumnRepository for MemoryStore {
    async fn create(&self, column: NewColumn) -> ServiceResult<Column> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let column = Column {
            id: Uuid::new_v4(),
            board_id: column.board_id,
            title: column.title,
            order: column.order,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.columns.push(column.clone());
        Ok(column)
    }

    async fn find_scoped(&self, id: Uuid) -> ServiceResult<Option<Scoped<Column>>> {
        let state = self.state.read().await;
        let Some((board_id, owner_id)) = state.column_scope(id) else {
            return Ok(None);
        };
        Ok(state
            .columns
            .iter()
            .find(|c| c.id == id)
            .map(|c| Scoped::new(c.clone(), board_id, owner_id)))
    }

    async fn list_by_board(&self, board_id: Uuid) -> ServiceResult<Vec<Column>> {
        let state = self.state.read().await;
        let mut columns: Vec<Column> = state
            .columns
            .iter()
            .filter(|c| c.board_id == board_id && c.deleted_at.is_none())
            .cloned()
            .collect();
        sort_columns(&mut columns);
        Ok(columns)
    }

    async fn next_order(&self, board_id: Uuid) -> ServiceResult<i32> {
        let state = self.state.read().await;
        let max = state
            .columns
            .iter()
            .filter(|c| c.board_id == board_id && c.deleted_at.is_none())
            .map(|c| c.order)
            .max();
        Ok(max.map_or(1, |m| m.saturating_add(1)))
    }

    async fn update(&self, id: Uuid, changes: ColumnChanges) -> ServiceResult<Option<Column>> {
        let mut state = self.state.write().await;
        let Some(column) = state
            .columns
            .iter_mut()
            .find(|c| c.id == id && c.deleted_at.is_none())
        else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            column.title = title;
        }
        if let Some(order) = changes.order {
            column.order = order;
        }
        column.updated_at = Utc::now();
        Ok(Some(column.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        match state
            .columns
            .iter_mut()
            .find(|c| c.id == id && c.deleted_at.is_none())
        {
            Some(column) => {
                column.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn create(&self, task: NewTask) -> ServiceResult<Task> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            column_id: task.column_id,
            title: task.title,
            description: task.description,
            deadline: task.deadline,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_scoped(&self, id: Uuid) -> ServiceResult<Option<Scoped<Task>>> {
        let state = self.state.read().await;
        let Some((board_id, owner_id)) = state.task_scope(id) else {
            return Ok(None);
        };
        Ok(state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| Scoped::new(t.clone(), board_id, owner_id)))
    }

    async fn list_by_column(
        &self,
        column_id: Uuid,
        title: Option<&str>,
        page: Page,
    ) -> ServiceResult<PageOf<Task>> {
        let state = self.state.read().await;
        let tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.column_id == column_id && t.deleted_at.is_none())
            .filter(|t| title.map_or(true, |needle| t.title_contains(needle)))
            .cloned()
            .collect();
        Ok(page_of(tasks, Some(page)))
    }

    async fn search_in_board(
        &self,
        board_id: Uuid,
        keyword: &str,
        page: Page,
    ) -> ServiceResult<PageOf<Task>> {
        let state = self.state.read().await;
        let columns: Vec<Uuid> = state
            .columns
            .iter()
            .filter(|c| c.board_id == board_id && c.deleted_at.is_none())
            .map(|c| c.id)
            .collect();
        let tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.deleted_at.is_none() && columns.contains(&t.column_id))
            .filter(|t| t.matches_keyword(keyword))
            .cloned()
            .collect();
        Ok(page_of(tasks, Some(page)))
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> ServiceResult<Option<Task>> {
        let mut state = self.state.write().await;
        let Some(task) = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.deleted_at.is_none())
        else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(deadline) = changes.deadline {
            task.deadline = deadline;
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn move_to_column(&self, id: Uuid, column_id: Uuid) -> ServiceResult<Option<Task>> {
        let mut state = self.state.write().await;
        let Some(task) = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.deleted_at.is_none())
        else {
            return Ok(None);
        };

        task.column_id = column_id;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        match state
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.deleted_at.is_none())
        {
            Some(task) => {
                task.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_id_unscoped(&self, id: Uuid) -> ServiceResult<Option<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.iter().find(|t| t.id == id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: NewComment) -> ServiceResult<Comment> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            task_id: comment.task_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_scoped(&self, id: Uuid) -> ServiceResult<Option<Scoped<Comment>>> {
        let state = self.state.read().await;
        let Some(comment) = state
            .comments
            .iter()
            .find(|c| c.id == id && c.deleted_at.is_none())
        else {
            return Ok(None);
        };
        Ok(state
            .task_scope(comment.task_id)
            .map(|(board_id, owner_id)| Scoped::new(comment.clone(), board_id, owner_id)))
    }

    async fn list_by_task(
        &self,
        task_id: Uuid,
        page: Option<Page>,
    ) -> ServiceResult<PageOf<Comment>> {
        let state = self.state.read().await;
        let comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.task_id == task_id && c.deleted_at.is_none())
            .cloned()
            .collect();
        Ok(page_of(comments, page))
    }

    async fn update(&self, id: Uuid, content: String) -> ServiceResult<Option<Comment>> {
        let mut state = self.state.write().await;
        let Some(comment) = state
            .comments
            .iter_mut()
            .find(|c| c.id == id && c.deleted_at.is_none())
        else {
            return Ok(None);
        };

        comment.content = content;
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        match state
            .comments
            .iter_mut()
            .find(|c| c.id == id && c.deleted_at.is_none())
        {
            Some(comment) => {
                comment.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

#[async_trait]
impl AttachmentRepository for MemoryStore {
    async fn create(&self, attachment: NewAttachment) -> ServiceResult<Attachment> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let attachment = Attachment {
            id: Uuid::new_v4(),
            task_id: attachment.task_id,
            file_name: attachment.file_name,
            file_url: attachment.file_url,
            file_size: attachment.file_size,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.attachments.push(attachment.clone());
        Ok(attachment)
    }

    async fn find_scoped(&self, id: Uuid) -> ServiceResult<Option<Scoped<Attachment>>> {
        let state = self.state.read().await;
        let Some(attachment) = state
            .attachments
            .iter()
            .find(|a| a.id == id && a.deleted_at.is_none())
        else {
            return Ok(None);
        };
        Ok(state
            .task_scope(attachment.task_id)
            .map(|(board_id, owner_id)| Scoped::new(attachment.clone(), board_id, owner_id)))
    }

    async fn list_by_task(
        &self,
        task_id: Uuid,
        page: Option<Page>,
    ) -> ServiceResult<PageOf<Attachment>> {
        let state = self.state.read().await;
        let attachments: Vec<Attachment> = state
            .attachments
            .iter()
            .filter(|a| a.task_id == task_id && a.deleted_at.is_none())
            .cloned()
            .collect();
        Ok(page_of(attachments, page))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: AttachmentChanges,
    ) -> ServiceResult<Option<Attachment>> {
        let mut state = self.state.write().await;
        let Some(attachment) = state
            .attachments
            .iter_mut()
            .find(|a| a.id == id && a.deleted_at.is_none())
        else {
            return Ok(None);
        };

        if let Some(file_name) = changes.file_name {
            attachment.file_name = file_name;
        }
        if let Some(file_url) = changes.file_url {
            attachment.file_url = file_url;
        }
        if let Some(file_size) = changes.file_size {
            attachment.file_size = file_size;
        }
        attachment.updated_at = Utc::now();
        Ok(Some(attachment.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        match state
            .attachments
            .iter_mut()
            .find(|a| a.id == id && a.deleted_at.is_none())
        {
            Some(attachment) => {
                attachment.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[async_trait]
impl LabelRepository for MemoryStore {
    async fn create(&self, label: NewLabel) -> ServiceResult<Label> {
        let mut state = self.state.write().await;
        if state.label_name_taken(&label.name, None) {
            return Err(ServiceError::conflict("label name already exists"));
        }

        let now = Utc::now();
        let label = Label {
            id: Uuid::new_v4(),
            name: label.name,
            color: label.color,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.labels.push(label.clone());
        Ok(label)
    }

    async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<Label>> {
        let state = self.state.read().await;
        Ok(state
            .labels
            .iter()
            .find(|l| l.id == id && l.deleted_at.is_none())
            .cloned())
    }

    async fn list(&self, page: Page) -> ServiceResult<PageOf<Label>> {
        let state = self.state.read().await;
        let mut labels: Vec<Label> = state
            .labels
            .iter()
            .filter(|l| l.deleted_at.is_none())
            .cloned()
            .collect();
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(page_of(labels, Some(page)))
    }

    async fn update(&self, id: Uuid, changes: LabelChanges) -> ServiceResult<Option<Label>> {
        let mut state = self.state.write().await;
        if let Some(name) = &changes.name {
            if state.label_name_taken(name, Some(id)) {
                return Err(ServiceError::conflict("label name already exists"));
            }
        }

        let Some(label) = state
            .labels
            .iter_mut()
            .find(|l| l.id == id && l.deleted_at.is_none())
        else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            label.name = name;
        }
        if let Some(color) = changes.color {
            label.color = color;
        }
        label.updated_at = Utc::now();
        Ok(Some(label.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        match state
            .labels
            .iter_mut()
            .find(|l| l.id == id && l.deleted_at.is_none())
        {
            Some(label) => {
                label.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn attach(&self, task_id: Uuid, label_id: Uuid) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        if !state.task_labels.contains(&(task_id, label_id)) {
            state.task_labels.push((task_id, label_id));
        }
        Ok(())
    }

    async fn detach(&self, task_id: Uuid, label_id: Uuid) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        state
            .task_labels
            .retain(|pair| *pair != (task_id, label_id));
        Ok(())
    }

    async fn list_for_task(&self, task_id: Uuid) -> ServiceResult<Vec<Label>> {
        let state = self.state.read().await;
        let mut labels: Vec<Label> = state
            .task_labels
            .iter()
            .filter(|(t, _)| *t == task_id)
            .filter_map(|(_, label_id)| {
                state
                    .labels
                    .iter()
                    .find(|l| l.id == *label_id && l.deleted_at.is_none())
                    .cloned()
            })
            .collect();
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::board::DEFAULT_COLUMNS;

    async fn seeded_board(store: &MemoryStore, owner: Uuid) -> BoardWithColumns {
        BoardRepository::create_with_columns(
            store,
            NewBoard {
                user_id: owner,
                title: "B".into(),
                color: String::new(),
            },
            &DEFAULT_COLUMNS,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_scoped_task_hidden_under_deleted_board() {
        let store = MemoryStore::default();
        let owner = Uuid::new_v4();
        let board = seeded_board(&store, owner).await;

        let task = TaskRepository::create(
            &store,
            NewTask {
                column_id: board.columns[0].id,
                title: "t".into(),
                description: String::new(),
                deadline: None,
            },
        )
        .await
        .unwrap();

        let scoped = TaskRepository::find_scoped(&store, task.id).await.unwrap().unwrap();
        assert_eq!(scoped.owner_id, owner);
        assert_eq!(scoped.board_id, board.board.id);

        BoardRepository::soft_delete(&store, board.board.id).await.unwrap();
        assert!(TaskRepository::find_scoped(&store, task.id).await.unwrap().is_none());
        assert!(TaskRepository::find_by_id_unscoped(&store, task.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_attach_is_idempotent() {
        let store = MemoryStore::default();
        let task_id = Uuid::new_v4();
        let label = LabelRepository::create(
            &store,
            NewLabel {
                name: "bug".into(),
                color: "red".into(),
            },
        )
        .await
        .unwrap();

        store.attach(task_id, label.id).await.unwrap();
        store.attach(task_id, label.id).await.unwrap();
        assert_eq!(store.list_for_task(task_id).await.unwrap().len(), 1);

        store.detach(task_id, label.id).await.unwrap();
        store.detach(task_id, label.id).await.unwrap();
        assert!(store.list_for_task(task_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_email_unique_case_insensitive() {
        let store = MemoryStore::default();
        let new_user = |email: &str, username: &str| NewUser {
            username: username.into(),
            email: email.into(),
            password_hash: "password1".into(),
        };

        UserRepository::create(&store, new_user("a@e.com", "a")).await.unwrap();
        let err = UserRepository::create(&store, new_user("A@E.com", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }
}
