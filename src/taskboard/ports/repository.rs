//! Repository ports for taskboard persistence, lookup, and batch updates.
//!
//! The four traits split the persistence collaborator along entity lines;
//! adapters typically implement all of them on one type. Every write runs
//! inside one storage transaction so a crash or concurrent reader never
//! observes a partially-updated board graph.

use crate::taskboard::domain::{
    Block, BlockId, Board, BoardId, Card, CardId, Column, ColumnId, ColumnKind,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Board persistence contract.
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Stores a new board.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Persistence`] on storage failure.
    async fn insert_board(&self, board: &Board) -> RepositoryResult<()>;

    /// Persists changes to an existing board.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::BoardNotFound`] when the board does not
    /// exist.
    async fn update_board(&self, board: &Board) -> RepositoryResult<()>;

    /// Deletes a board together with its columns, their cards, and their
    /// blocks, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::BoardNotFound`] when the board does not
    /// exist.
    async fn delete_board(&self, id: BoardId) -> RepositoryResult<()>;

    /// Finds a board by identifier.
    ///
    /// Returns `None` when the board does not exist.
    async fn find_board(&self, id: BoardId) -> RepositoryResult<Option<Board>>;

    /// Returns all boards, ordered by name.
    async fn list_boards(&self) -> RepositoryResult<Vec<Board>>;
}

/// Column persistence contract.
#[async_trait]
pub trait ColumnRepository: Send + Sync {
    /// Stores a new column.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateSpecialColumn`] when the column
    /// has a special kind already present on the board. This is the storage
    /// constraint backing special-column uniqueness; it holds even when a
    /// service pre-check raced with a concurrent writer.
    async fn insert_column(&self, column: &Column) -> RepositoryResult<()>;

    /// Persists changes to an existing column.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ColumnNotFound`] when the column does not
    /// exist and [`RepositoryError::DuplicateSpecialColumn`] when a kind
    /// change collides with another special column on the board.
    async fn update_column(&self, column: &Column) -> RepositoryResult<()>;

    /// Applies a batch of `(column, order)` assignments atomically: either
    /// every column receives its new order or none does.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ColumnNotFound`] when any assignment
    /// references a column that does not exist or does not belong to the
    /// board; no order is changed in that case.
    async fn update_column_orders(
        &self,
        board_id: BoardId,
        assignments: &[(ColumnId, i32)],
    ) -> RepositoryResult<()>;

    /// Deletes a column together with its cards and their blocks, in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ColumnNotFound`] when the column does not
    /// exist.
    async fn delete_column(&self, id: ColumnId) -> RepositoryResult<()>;

    /// Finds a column by identifier.
    ///
    /// Returns `None` when the column does not exist.
    async fn find_column(&self, id: ColumnId) -> RepositoryResult<Option<Column>>;

    /// Returns the board's columns ordered by display order, ties broken by
    /// identifier so sparse or duplicate orders still yield a deterministic
    /// sequence.
    async fn list_columns(&self, board_id: BoardId) -> RepositoryResult<Vec<Column>>;

    /// Finds the board's column of the given kind, if present.
    ///
    /// For special kinds the storage constraint keeps this unique; for
    /// [`ColumnKind::Pending`] the first column in display order is
    /// returned.
    async fn find_column_by_kind(
        &self,
        board_id: BoardId,
        kind: ColumnKind,
    ) -> RepositoryResult<Option<Column>>;
}

/// Card persistence contract.
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Stores a new card.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Persistence`] on storage failure.
    async fn insert_card(&self, card: &Card) -> RepositoryResult<()>;

    /// Persists changes to an existing card (details, column reference,
    /// timestamps).
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::CardNotFound`] when the card does not
    /// exist.
    async fn update_card(&self, card: &Card) -> RepositoryResult<()>;

    /// Deletes a card together with its block history, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::CardNotFound`] when the card does not
    /// exist.
    async fn delete_card(&self, id: CardId) -> RepositoryResult<()>;

    /// Finds a card by identifier.
    ///
    /// Returns `None` when the card does not exist.
    async fn find_card(&self, id: CardId) -> RepositoryResult<Option<Card>>;

    /// Returns the column's cards, oldest first.
    async fn list_cards_by_column(&self, column_id: ColumnId) -> RepositoryResult<Vec<Card>>;

    /// Returns every card on the board, oldest first.
    async fn list_cards_by_board(&self, board_id: BoardId) -> RepositoryResult<Vec<Card>>;

    /// Counts the cards currently in the column.
    async fn count_cards_in_column(&self, column_id: ColumnId) -> RepositoryResult<usize>;
}

/// Block persistence contract.
#[async_trait]
pub trait BlockRepository: Send + Sync {
    /// Stores a new block.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::OpenBlockExists`] when the card already
    /// has an open block. This is the storage constraint backing the
    /// at-most-one-open-block invariant; it holds even when a service
    /// pre-check raced with a concurrent writer.
    async fn insert_block(&self, block: &Block) -> RepositoryResult<()>;

    /// Persists changes to an existing block (closing it).
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::BlockNotFound`] when the block does not
    /// exist.
    async fn update_block(&self, block: &Block) -> RepositoryResult<()>;

    /// Finds a block by identifier.
    ///
    /// Returns `None` when the block does not exist.
    async fn find_block(&self, id: BlockId) -> RepositoryResult<Option<Block>>;

    /// Finds the card's open block, if any.
    async fn find_open_block(&self, card_id: CardId) -> RepositoryResult<Option<Block>>;

    /// Returns the card's full block history, oldest first.
    async fn list_blocks_by_card(&self, card_id: CardId) -> RepositoryResult<Vec<Block>>;

    /// Returns blocks whose `blocked_at` falls inside the inclusive range,
    /// oldest first, optionally restricted to blocks still open.
    async fn list_blocks_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        open_only: bool,
    ) -> RepositoryResult<Vec<Block>>;
}

/// Errors returned by repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// The board was not found.
    #[error("board not found: {0}")]
    BoardNotFound(BoardId),

    /// The column was not found.
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    /// The card was not found.
    #[error("card not found: {0}")]
    CardNotFound(CardId),

    /// The block was not found.
    #[error("block not found: {0}")]
    BlockNotFound(BlockId),

    /// A column of the same special kind already exists on the board.
    #[error("a {kind} column already exists on board {board_id}")]
    DuplicateSpecialColumn {
        /// Board carrying the conflicting column.
        board_id: BoardId,
        /// The special kind that collided.
        kind: ColumnKind,
    },

    /// The card already has an open block.
    #[error("card {0} already has an open block")]
    OpenBlockExists(CardId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
