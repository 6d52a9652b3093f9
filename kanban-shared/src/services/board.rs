/// Boards and their default columns

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{gone, owned_board};
use crate::auth::authorization::require_owner;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    board::{Board, BoardChanges, BoardWithColumns, NewBoard, DEFAULT_COLUMNS},
    non_empty,
};
use crate::pagination::{Page, Paginated};
use crate::repositories::BoardRepository;
use crate::validation::required;

#[derive(Clone)]
pub struct BoardService {
    boards: Arc<dyn BoardRepository>,
}

impl BoardService {
    pub fn new(boards: Arc<dyn BoardRepository>) -> Self {
        Self { boards }
    }

    /// Creates the board seeded with "To Do", "In Progress" and "Done"
    ///
    /// Board and columns are written in one transaction.
    pub async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        color: &str,
    ) -> ServiceResult<BoardWithColumns> {
        let title = required("title", title)?;
        let board = self
            .boards
            .create_with_columns(
                NewBoard {
                    user_id,
                    title,
                    color: color.trim().to_string(),
                },
                &DEFAULT_COLUMNS,
            )
            .await?;

        info!(board_id = %board.board.id, user_id = %user_id, "board created");
        Ok(board)
    }

    pub async fn find_by_id(&self, board_id: Uuid, caller: Uuid) -> ServiceResult<BoardWithColumns> {
        let board = self
            .boards
            .find_with_columns(board_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("board not found"))?;
        require_owner(caller, board)
    }

    /// The caller's boards, newest first
    pub async fn find_by_user(&self, caller: Uuid, page: Page) -> ServiceResult<Paginated<Board>> {
        let (boards, total) = self.boards.list_by_user(caller, page).await?;
        Ok(Paginated::new(boards, page, total))
    }

    /// Empty strings leave the field unchanged
    pub async fn update(
        &self,
        board_id: Uuid,
        caller: Uuid,
        changes: BoardChanges,
    ) -> ServiceResult<Board> {
        owned_board(self.boards.as_ref(), caller, board_id).await?;

        let changes = BoardChanges {
            title: non_empty(changes.title),
            color: non_empty(changes.color),
        };
        let board = self
            .boards
            .update(board_id, changes)
            .await?
            .ok_or_else(|| gone("board"))?;

        info!(board_id = %board_id, "board updated");
        Ok(board)
    }

    pub async fn delete(&self, board_id: Uuid, caller: Uuid) -> ServiceResult<()> {
        owned_board(self.boards.as_ref(), caller, board_id).await?;

        if !self.boards.soft_delete(board_id).await? {
            return Err(gone("board"));
        }
        info!(board_id = %board_id, "board deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{board, services, user};

    #[tokio::test]
    async fn test_create_trims_and_requires_title() {
        let services = services();
        let u = user(&services, "alice").await;

        let err = services.boards.create(u.id, "   ", "#fff").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: Some(f), .. } if f == "title"));

        let b = services.boards.create(u.id, "  Plan ", " #fff ").await.unwrap();
        assert_eq!(b.board.title, "Plan");
        assert_eq!(b.board.color, "#fff");
    }

    #[tokio::test]
    async fn test_create_seeds_default_columns() {
        let services = services();
        let u = user(&services, "alice").await;
        let b = board(&services, u.id, "B").await;

        let columns: Vec<_> = b
            .columns
            .iter()
            .map(|c| (c.title.as_str(), c.order))
            .collect();
        assert_eq!(columns, [("To Do", 1), ("In Progress", 2), ("Done", 3)]);

        let loaded = services.boards.find_by_id(b.board.id, u.id).await.unwrap();
        assert_eq!(loaded.columns.len(), 3);
    }

    #[tokio::test]
    async fn test_foreign_board_is_unauthorized() {
        let services = services();
        let alice = user(&services, "alice").await;
        let bob = user(&services, "bob").await;
        let b = board(&services, alice.id, "B").await;

        let err = services.boards.find_by_id(b.board.id, bob.id).await.unwrap_err();
        assert!(
            matches!(err, ServiceError::Unauthorized(m) if m == "you do not have access to this board")
        );

        let err = services
            .boards
            .update(b.board.id, bob.id, BoardChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_update_empty_fields_unchanged() {
        let services = services();
        let u = user(&services, "alice").await;
        let b = board(&services, u.id, "B").await;

        let updated = services
            .boards
            .update(
                b.board.id,
                u.id,
                BoardChanges {
                    title: Some(String::new()),
                    color: Some("#000".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "B");
        assert_eq!(updated.color, "#000");
    }

    #[tokio::test]
    async fn test_delete_then_find_is_not_found() {
        let services = services();
        let u = user(&services, "alice").await;
        let b = board(&services, u.id, "B").await;

        services.boards.delete(b.board.id, u.id).await.unwrap();
        let err = services.boards.find_by_id(b.board.id, u.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = services.boards.delete(b.board.id, u.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_by_user_paginates() {
        let services = services();
        let u = user(&services, "alice").await;
        let other = user(&services, "bob").await;
        for i in 0..25 {
            board(&services, u.id, &format!("B{}", i)).await;
        }
        board(&services, other.id, "theirs").await;

        let page = services
            .boards
            .find_by_user(u.id, Page::new(Some(2), Some(10)))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.meta.total, 25);
        assert_eq!(page.meta.total_pages, 3);
    }
}
