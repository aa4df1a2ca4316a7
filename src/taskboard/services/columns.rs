//! Column service: kind policy, ordering policy, and column CRUD.

use crate::taskboard::{
    domain::{BoardId, Column, ColumnId, ColumnKind},
    ports::{BoardRepository, CardRepository, ColumnRepository},
};
use std::collections::HashSet;
use std::sync::Arc;

use super::error::{ResourceKind, TaskboardError, TaskboardResult};

/// Request payload for creating a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateColumnRequest {
    name: String,
    kind: ColumnKind,
    order: i32,
}

impl CreateColumnRequest {
    /// Creates a request with the required fields and automatic ordering.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            order: 0,
        }
    }

    /// Requests an explicit display order.
    ///
    /// Values of zero or below keep automatic assignment (one past the
    /// current column count). Positive values are used verbatim without a
    /// collision check; duplicates are tolerated and can be compacted with
    /// [`ColumnService::normalize`].
    #[must_use]
    pub const fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

/// Column orchestration service.
#[derive(Clone)]
pub struct ColumnService<R>
where
    R: BoardRepository + ColumnRepository + CardRepository,
{
    repository: Arc<R>,
}

impl<R> ColumnService<R>
where
    R: BoardRepository + ColumnRepository + CardRepository,
{
    /// Creates a new column service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Lists the board's columns in display order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::Repository`] when the lookup fails.
    pub async fn list(&self, board_id: BoardId) -> TaskboardResult<Vec<Column>> {
        Ok(self.repository.list_columns(board_id).await?)
    }

    /// Retrieves a column by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the column does not exist.
    pub async fn get(&self, id: ColumnId) -> TaskboardResult<Column> {
        self.repository
            .find_column(id)
            .await?
            .ok_or(TaskboardError::NotFound {
                resource: ResourceKind::Column,
                id: id.into_inner(),
            })
    }

    /// Creates a column on the board.
    ///
    /// Special kinds are checked against the board's existing columns; a
    /// requested order of zero or below is replaced with one past the
    /// current column count.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the board does not exist,
    /// [`TaskboardError::SpecialColumnConflict`] when a special kind is
    /// already present, and [`TaskboardError::Domain`] when the name is
    /// blank.
    pub async fn create(
        &self,
        board_id: BoardId,
        request: CreateColumnRequest,
    ) -> TaskboardResult<Column> {
        if self.repository.find_board(board_id).await?.is_none() {
            return Err(TaskboardError::NotFound {
                resource: ResourceKind::Board,
                id: board_id.into_inner(),
            });
        }
        self.ensure_kind_available(board_id, request.kind, None)
            .await?;

        let order = if request.order <= 0 {
            let count = self.repository.list_columns(board_id).await?.len();
            i32::try_from(count.saturating_add(1)).unwrap_or(i32::MAX)
        } else {
            request.order
        };

        let column = Column::new(board_id, request.name, request.kind, order)?;
        self.repository.insert_column(&column).await?;
        tracing::info!(
            column_id = %column.id(),
            board_id = %board_id,
            kind = column.kind().as_str(),
            "created column"
        );
        Ok(column)
    }

    /// Renames a column and optionally changes its kind.
    ///
    /// A kind change to a special kind scans the board's other columns for
    /// a conflict; a change to PENDING applies without a scan.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the column does not exist,
    /// [`TaskboardError::SpecialColumnConflict`] when the new kind collides,
    /// and [`TaskboardError::Domain`] when the name is blank.
    pub async fn update(
        &self,
        id: ColumnId,
        name: impl Into<String>,
        new_kind: Option<ColumnKind>,
    ) -> TaskboardResult<Column> {
        let mut column = self.get(id).await?;
        column.rename(name)?;
        if let Some(kind) = new_kind {
            if kind != column.kind() {
                self.ensure_kind_available(column.board_id(), kind, Some(id))
                    .await?;
                column.change_kind(kind);
            }
        }
        self.repository.update_column(&column).await?;
        Ok(column)
    }

    /// Deletes a column.
    ///
    /// Special columns are never deletable through this path, and a PENDING
    /// column must be empty before removal.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the column does not exist,
    /// [`TaskboardError::SpecialColumnProtected`] for non-PENDING kinds, and
    /// [`TaskboardError::ColumnNotEmpty`] when cards remain.
    pub async fn delete(&self, id: ColumnId) -> TaskboardResult<()> {
        let column = self.get(id).await?;
        if column.kind() != ColumnKind::Pending {
            return Err(TaskboardError::SpecialColumnProtected {
                column_id: id,
                kind: column.kind(),
            });
        }
        let card_count = self.repository.count_cards_in_column(id).await?;
        if card_count > 0 {
            return Err(TaskboardError::ColumnNotEmpty {
                column_id: id,
                card_count,
            });
        }
        self.repository.delete_column(id).await?;
        tracing::info!(column_id = %id, "deleted column");
        Ok(())
    }

    /// Applies a caller-supplied permutation of the board's columns.
    ///
    /// Each column's order becomes its 1-based position in `ordered_ids`;
    /// the batch applies atomically. Returns the columns in their new
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the board does not exist
    /// and [`TaskboardError::InvalidReorderSet`] when `ordered_ids` is not
    /// an exact permutation of the board's column ids; no order changes in
    /// either case.
    pub async fn reorder(
        &self,
        board_id: BoardId,
        ordered_ids: &[ColumnId],
    ) -> TaskboardResult<Vec<Column>> {
        if self.repository.find_board(board_id).await?.is_none() {
            return Err(TaskboardError::NotFound {
                resource: ResourceKind::Board,
                id: board_id.into_inner(),
            });
        }
        let columns = self.repository.list_columns(board_id).await?;
        let current: HashSet<ColumnId> = columns.iter().map(Column::id).collect();
        let supplied: HashSet<ColumnId> = ordered_ids.iter().copied().collect();
        if ordered_ids.len() != columns.len() || supplied != current {
            return Err(TaskboardError::InvalidReorderSet { board_id });
        }

        let assignments: Vec<(ColumnId, i32)> = (1i32..)
            .zip(ordered_ids.iter().copied())
            .map(|(order, column_id)| (column_id, order))
            .collect();
        self.repository
            .update_column_orders(board_id, &assignments)
            .await?;
        tracing::info!(board_id = %board_id, columns = assignments.len(), "reordered columns");
        Ok(self.repository.list_columns(board_id).await?)
    }

    /// Compacts the board's column orders to a contiguous `1..=N` sequence,
    /// preserving the current relative order and skipping columns whose
    /// order is already correct. Idempotent: a second call right after the
    /// first changes nothing. Returns the columns in their new order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the board does not exist.
    pub async fn normalize(&self, board_id: BoardId) -> TaskboardResult<Vec<Column>> {
        if self.repository.find_board(board_id).await?.is_none() {
            return Err(TaskboardError::NotFound {
                resource: ResourceKind::Board,
                id: board_id.into_inner(),
            });
        }
        let columns = self.repository.list_columns(board_id).await?;
        let assignments: Vec<(ColumnId, i32)> = (1i32..)
            .zip(columns.iter())
            .filter(|(order, column)| column.order() != *order)
            .map(|(order, column)| (column.id(), order))
            .collect();
        if !assignments.is_empty() {
            self.repository
                .update_column_orders(board_id, &assignments)
                .await?;
            tracing::debug!(
                board_id = %board_id,
                rewritten = assignments.len(),
                "normalized column orders"
            );
        }
        Ok(self.repository.list_columns(board_id).await?)
    }

    /// Scans the board for a conflicting special column, excluding the
    /// column being updated when `exclude` is set. PENDING kinds always
    /// pass.
    async fn ensure_kind_available(
        &self,
        board_id: BoardId,
        kind: ColumnKind,
        exclude: Option<ColumnId>,
    ) -> TaskboardResult<()> {
        if !kind.is_special() {
            return Ok(());
        }
        // Pre-check for a precise conflict error; the storage constraint
        // still covers the window between check and insert.
        match self.repository.find_column_by_kind(board_id, kind).await? {
            Some(existing) if exclude != Some(existing.id()) => {
                Err(TaskboardError::SpecialColumnConflict { board_id, kind })
            }
            _ => Ok(()),
        }
    }
}
