/// Ownership checks
///
/// Every data operation ends in a single identity comparison: the caller must
/// be the user who owns the board the entity hangs under. Repositories load
/// the entity already joined up to its board (see [`Scoped`]), so the check
/// itself never touches the database.
///
/// # Example
///
/// ```
/// use kanban_shared::auth::authorization::require_owner;
/// use kanban_shared::models::{column::Column, Scoped};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// let owner = Uuid::new_v4();
/// let column = Column {
///     id: Uuid::new_v4(),
///     board_id: Uuid::new_v4(),
///     title: "To Do".into(),
///     order: 1,
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
///     deleted_at: None,
/// };
/// let scoped = Scoped::new(column.clone(), column.board_id, owner);
///
/// assert!(require_owner(owner, scoped.clone()).is_ok());
/// assert!(require_owner(Uuid::new_v4(), scoped).is_err());
/// ```

use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    board::{Board, BoardWithColumns},
    EntityKind, Scoped,
};

/// Anything that resolves to the user owning its board
pub trait Owned {
    fn owner_id(&self) -> Uuid;

    /// Entity name used in the denial message
    fn kind(&self) -> &'static str;
}

impl Owned for Board {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn kind(&self) -> &'static str {
        Board::KIND
    }
}

impl Owned for BoardWithColumns {
    fn owner_id(&self) -> Uuid {
        self.board.user_id
    }

    fn kind(&self) -> &'static str {
        Board::KIND
    }
}

impl<T: EntityKind> Owned for Scoped<T> {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn kind(&self) -> &'static str {
        T::KIND
    }
}

/// Passes `entity` through if `caller` owns it
///
/// # Errors
///
/// `Unauthorized("you do not have access to this <kind>")` otherwise.
pub fn require_owner<E: Owned>(caller: Uuid, entity: E) -> ServiceResult<E> {
    if entity.owner_id() != caller {
        tracing::warn!(
            caller = %caller,
            owner = %entity.owner_id(),
            kind = entity.kind(),
            "ownership check denied"
        );
        return Err(ServiceError::unauthorized(format!(
            "you do not have access to this {}",
            entity.kind()
        )));
    }
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::Task;
    use chrono::Utc;

    fn board(owner: Uuid) -> Board {
        let now = Utc::now();
        Board {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "B".into(),
            color: String::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_owner_passes() {
        let owner = Uuid::new_v4();
        let b = require_owner(owner, board(owner)).unwrap();
        assert_eq!(b.user_id, owner);
    }

    #[test]
    fn test_foreign_board_denied_with_kind() {
        let err = require_owner(Uuid::new_v4(), board(Uuid::new_v4())).unwrap_err();
        match err {
            ServiceError::Unauthorized(msg) => {
                assert_eq!(msg, "you do not have access to this board")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_scoped_uses_board_owner() {
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            column_id: Uuid::new_v4(),
            title: "t".into(),
            description: String::new(),
            deadline: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let scoped = Scoped::new(task, Uuid::new_v4(), owner);

        assert!(require_owner(owner, scoped.clone()).is_ok());
        let err = require_owner(Uuid::new_v4(), scoped).unwrap_err();
        assert!(err.to_string().contains("this task"));
    }
}
