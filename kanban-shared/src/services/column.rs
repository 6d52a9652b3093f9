/// Column management within a board

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{gone, owned_board, owned_column};
use crate::error::ServiceResult;
use crate::models::{
    column::{Column, ColumnChanges, NewColumn},
    non_empty,
};
use crate::repositories::{BoardRepository, ColumnRepository};
use crate::validation::required;

#[derive(Clone)]
pub struct ColumnService {
    boards: Arc<dyn BoardRepository>,
    columns: Arc<dyn ColumnRepository>,
}

impl ColumnService {
    pub fn new(boards: Arc<dyn BoardRepository>, columns: Arc<dyn ColumnRepository>) -> Self {
        Self { boards, columns }
    }

    /// Appends after the last column when `order` is not given
    pub async fn create(
        &self,
        caller: Uuid,
        board_id: Uuid,
        title: &str,
        order: Option<i32>,
    ) -> ServiceResult<Column> {
        let title = required("title", title)?;
        owned_board(self.boards.as_ref(), caller, board_id).await?;

        let order = match order {
            Some(order) => order,
            None => self.columns.next_order(board_id).await?,
        };
        let column = self
            .columns
            .create(NewColumn {
                board_id,
                title,
                order,
            })
            .await?;

        info!(column_id = %column.id, board_id = %board_id, "column created");
        Ok(column)
    }

    pub async fn find_by_id(&self, column_id: Uuid, caller: Uuid) -> ServiceResult<Column> {
        Ok(owned_column(self.columns.as_ref(), caller, column_id)
            .await?
            .into_inner())
    }

    pub async fn list_by_board(&self, board_id: Uuid, caller: Uuid) -> ServiceResult<Vec<Column>> {
        owned_board(self.boards.as_ref(), caller, board_id).await?;
        self.columns.list_by_board(board_id).await
    }

    pub async fn update(
        &self,
        column_id: Uuid,
        caller: Uuid,
        changes: ColumnChanges,
    ) -> ServiceResult<Column> {
        owned_column(self.columns.as_ref(), caller, column_id).await?;

        let changes = ColumnChanges {
            title: non_empty(changes.title),
            order: changes.order,
        };
        self.columns
            .update(column_id, changes)
            .await?
            .ok_or_else(|| gone("column"))
    }

    pub async fn delete(&self, column_id: Uuid, caller: Uuid) -> ServiceResult<()> {
        owned_column(self.columns.as_ref(), caller, column_id).await?;

        if !self.columns.soft_delete(column_id).await? {
            return Err(gone("column"));
        }
        info!(column_id = %column_id, "column deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::services::testing::{board, services, user};

    #[tokio::test]
    async fn test_create_appends_after_last() {
        let services = services();
        let u = user(&services, "alice").await;
        let b = board(&services, u.id, "B").await;

        let column = services
            .columns
            .create(u.id, b.board.id, "Review", None)
            .await
            .unwrap();
        assert_eq!(column.order, 4);

        let columns = services.columns.list_by_board(b.board.id, u.id).await.unwrap();
        assert_eq!(columns.last().map(|c| c.title.as_str()), Some("Review"));
    }

    #[tokio::test]
    async fn test_foreign_column_denied() {
        let services = services();
        let alice = user(&services, "alice").await;
        let bob = user(&services, "bob").await;
        let b = board(&services, alice.id, "B").await;
        let column_id = b.columns[0].id;

        let err = services.columns.find_by_id(column_id, bob.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(m) if m.contains("column")));

        let err = services
            .columns
            .create(bob.id, b.board.id, "X", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let services = services();
        let u = user(&services, "alice").await;
        let b = board(&services, u.id, "B").await;
        let column_id = b.columns[1].id;

        let updated = services
            .columns
            .update(
                column_id,
                u.id,
                ColumnChanges {
                    title: Some("Doing".into()),
                    order: Some(7),
                },
            )
            .await
            .unwrap();
        assert_eq!((updated.title.as_str(), updated.order), ("Doing", 7));

        services.columns.delete(column_id, u.id).await.unwrap();
        let err = services.columns.find_by_id(column_id, u.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
