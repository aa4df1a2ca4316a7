//! Board aggregate service: lifecycle, default provisioning, and
//! special-column lookups.

use crate::taskboard::{
    domain::{Board, BoardId, Column, ColumnKind},
    ports::{BoardRepository, ColumnRepository},
};
use std::sync::Arc;

use super::error::{ResourceKind, TaskboardError, TaskboardResult};

/// Default columns provisioned for every new board, in display order.
const DEFAULT_COLUMNS: [(&str, ColumnKind); 5] = [
    ("Backlog", ColumnKind::Initial),
    ("To Do", ColumnKind::Pending),
    ("In Progress", ColumnKind::Pending),
    ("Done", ColumnKind::Final),
    ("Canceled", ColumnKind::Cancel),
];

/// Board aggregate orchestration service.
#[derive(Clone)]
pub struct BoardService<R>
where
    R: BoardRepository + ColumnRepository,
{
    repository: Arc<R>,
}

impl<R> BoardService<R>
where
    R: BoardRepository + ColumnRepository,
{
    /// Creates a new board service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns all boards.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::Repository`] when the lookup fails.
    pub async fn list(&self) -> TaskboardResult<Vec<Board>> {
        Ok(self.repository.list_boards().await?)
    }

    /// Retrieves a board by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the board does not exist.
    pub async fn get(&self, id: BoardId) -> TaskboardResult<Board> {
        self.repository
            .find_board(id)
            .await?
            .ok_or(TaskboardError::NotFound {
                resource: ResourceKind::Board,
                id: id.into_inner(),
            })
    }

    /// Creates a board and provisions its default columns: an INITIAL
    /// backlog, two PENDING work columns, a FINAL column, and a CANCEL
    /// column, ordered 1 through 5.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::Domain`] when the name is blank and
    /// [`TaskboardError::Repository`] when persistence fails.
    pub async fn create(&self, name: impl Into<String>) -> TaskboardResult<Board> {
        let board = Board::new(name)?;
        self.repository.insert_board(&board).await?;
        for (order, (column_name, kind)) in (1i32..).zip(DEFAULT_COLUMNS) {
            let column = Column::new(board.id(), column_name, kind, order)?;
            self.repository.insert_column(&column).await?;
        }
        tracing::info!(board_id = %board.id(), name = board.name(), "created board");
        Ok(board)
    }

    /// Renames a board.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the board does not exist
    /// and [`TaskboardError::Domain`] when the name is blank.
    pub async fn rename(&self, id: BoardId, name: impl Into<String>) -> TaskboardResult<Board> {
        let mut board = self.get(id).await?;
        board.rename(name)?;
        self.repository.update_board(&board).await?;
        Ok(board)
    }

    /// Deletes a board together with its columns, cards, and blocks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the board does not exist.
    pub async fn delete(&self, id: BoardId) -> TaskboardResult<()> {
        self.repository.delete_board(id).await?;
        tracing::info!(board_id = %id, "deleted board");
        Ok(())
    }

    /// Returns the board's INITIAL column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::MissingSpecialColumn`] when the column is
    /// absent. For a board provisioned through [`Self::create`] that is an
    /// integrity failure, never a normal empty result.
    pub async fn initial_column(&self, board_id: BoardId) -> TaskboardResult<Column> {
        require_special_column(self.repository.as_ref(), board_id, ColumnKind::Initial).await
    }

    /// Returns the board's CANCEL column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::MissingSpecialColumn`] when the column is
    /// absent, with the same integrity caveat as
    /// [`Self::initial_column`].
    pub async fn cancel_column(&self, board_id: BoardId) -> TaskboardResult<Column> {
        require_special_column(self.repository.as_ref(), board_id, ColumnKind::Cancel).await
    }
}

/// Resolves the unique column of a special kind, treating absence as an
/// integrity error.
pub(super) async fn require_special_column<R>(
    repository: &R,
    board_id: BoardId,
    kind: ColumnKind,
) -> TaskboardResult<Column>
where
    R: ColumnRepository,
{
    repository
        .find_column_by_kind(board_id, kind)
        .await?
        .ok_or(TaskboardError::MissingSpecialColumn { board_id, kind })
}
