//! In-memory repository for taskboard tests.
//!
//! Implements all four repository ports on one thread-safe store. The write
//! lock doubles as the transaction boundary: every mutating operation
//! checks its preconditions and applies its effects under a single guard,
//! so readers never observe a partially-applied change. The uniqueness
//! constraints (one special column per kind per board, one open block per
//! card) are enforced here exactly like the database's unique indexes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::taskboard::{
    domain::{Block, BlockId, Board, BoardId, Card, CardId, Column, ColumnId, ColumnKind},
    ports::{
        BlockRepository, BoardRepository, CardRepository, ColumnRepository, RepositoryError,
        RepositoryResult,
    },
};

/// Thread-safe in-memory taskboard repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskboardRepository {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    boards: HashMap<BoardId, Board>,
    columns: HashMap<ColumnId, Column>,
    cards: HashMap<CardId, Card>,
    blocks: HashMap<BlockId, Block>,
}

impl InMemoryTaskboardRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> RepositoryResult<RwLockReadGuard<'_, InMemoryState>> {
        self.state
            .read()
            .map_err(|err| RepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> RepositoryResult<RwLockWriteGuard<'_, InMemoryState>> {
        self.state
            .write()
            .map_err(|err| RepositoryError::persistence(std::io::Error::other(err.to_string())))
    }
}

/// Columns of a board in display order, ties broken by identifier.
fn sorted_columns(state: &InMemoryState, board_id: BoardId) -> Vec<Column> {
    let mut columns: Vec<Column> = state
        .columns
        .values()
        .filter(|column| column.board_id() == board_id)
        .cloned()
        .collect();
    columns.sort_by_key(|column| (column.order(), column.id().into_inner()));
    columns
}

/// Cards matching the filter, oldest first, ties broken by identifier.
fn sorted_cards(state: &InMemoryState, filter: impl Fn(&Card) -> bool) -> Vec<Card> {
    let mut cards: Vec<Card> = state
        .cards
        .values()
        .filter(|card| filter(card))
        .cloned()
        .collect();
    cards.sort_by_key(|card| (card.created_at(), card.id().into_inner()));
    cards
}

/// Checks the one-special-column-per-kind constraint, excluding `exclude`
/// so updates do not collide with the column being rewritten.
fn special_kind_taken(
    state: &InMemoryState,
    board_id: BoardId,
    kind: ColumnKind,
    exclude: Option<ColumnId>,
) -> bool {
    kind.is_special()
        && state.columns.values().any(|column| {
            column.board_id() == board_id
                && column.kind() == kind
                && Some(column.id()) != exclude
        })
}

/// Removes a card and its block history.
fn remove_card(state: &mut InMemoryState, card_id: CardId) {
    state.cards.remove(&card_id);
    state.blocks.retain(|_, block| block.card_id() != card_id);
}

/// Removes a column, its cards, and their blocks.
fn remove_column(state: &mut InMemoryState, column_id: ColumnId) {
    state.columns.remove(&column_id);
    let card_ids: Vec<CardId> = state
        .cards
        .values()
        .filter(|card| card.column_id() == column_id)
        .map(Card::id)
        .collect();
    for card_id in card_ids {
        remove_card(state, card_id);
    }
}

#[async_trait]
impl BoardRepository for InMemoryTaskboardRepository {
    async fn insert_board(&self, board: &Board) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        state.boards.insert(board.id(), board.clone());
        Ok(())
    }

    async fn update_board(&self, board: &Board) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.boards.contains_key(&board.id()) {
            return Err(RepositoryError::BoardNotFound(board.id()));
        }
        state.boards.insert(board.id(), board.clone());
        Ok(())
    }

    async fn delete_board(&self, id: BoardId) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.boards.remove(&id).is_none() {
            return Err(RepositoryError::BoardNotFound(id));
        }
        let column_ids: Vec<ColumnId> = state
            .columns
            .values()
            .filter(|column| column.board_id() == id)
            .map(Column::id)
            .collect();
        for column_id in column_ids {
            remove_column(&mut state, column_id);
        }
        Ok(())
    }

    async fn find_board(&self, id: BoardId) -> RepositoryResult<Option<Board>> {
        let state = self.read_state()?;
        Ok(state.boards.get(&id).cloned())
    }

    async fn list_boards(&self) -> RepositoryResult<Vec<Board>> {
        let state = self.read_state()?;
        let mut boards: Vec<Board> = state.boards.values().cloned().collect();
        boards.sort_by(|a, b| {
            a.name()
                .cmp(b.name())
                .then_with(|| a.id().into_inner().cmp(&b.id().into_inner()))
        });
        Ok(boards)
    }
}

#[async_trait]
impl ColumnRepository for InMemoryTaskboardRepository {
    async fn insert_column(&self, column: &Column) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        if special_kind_taken(&state, column.board_id(), column.kind(), None) {
            return Err(RepositoryError::DuplicateSpecialColumn {
                board_id: column.board_id(),
                kind: column.kind(),
            });
        }
        state.columns.insert(column.id(), column.clone());
        Ok(())
    }

    async fn update_column(&self, column: &Column) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.columns.contains_key(&column.id()) {
            return Err(RepositoryError::ColumnNotFound(column.id()));
        }
        if special_kind_taken(&state, column.board_id(), column.kind(), Some(column.id())) {
            return Err(RepositoryError::DuplicateSpecialColumn {
                board_id: column.board_id(),
                kind: column.kind(),
            });
        }
        state.columns.insert(column.id(), column.clone());
        Ok(())
    }

    async fn update_column_orders(
        &self,
        board_id: BoardId,
        assignments: &[(ColumnId, i32)],
    ) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        // Validate the whole batch before touching anything, so a bad
        // assignment cannot leave a half-applied permutation behind.
        for (column_id, order) in assignments {
            let belongs = state
                .columns
                .get(column_id)
                .is_some_and(|column| column.board_id() == board_id);
            if !belongs {
                return Err(RepositoryError::ColumnNotFound(*column_id));
            }
            if *order <= 0 {
                return Err(RepositoryError::persistence(std::io::Error::other(
                    format!("non-positive column order {order} in batch update"),
                )));
            }
        }
        for (column_id, order) in assignments {
            if let Some(column) = state.columns.get_mut(column_id) {
                column
                    .set_order(*order)
                    .map_err(RepositoryError::persistence)?;
            }
        }
        Ok(())
    }

    async fn delete_column(&self, id: ColumnId) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.columns.contains_key(&id) {
            return Err(RepositoryError::ColumnNotFound(id));
        }
        remove_column(&mut state, id);
        Ok(())
    }

    async fn find_column(&self, id: ColumnId) -> RepositoryResult<Option<Column>> {
        let state = self.read_state()?;
        Ok(state.columns.get(&id).cloned())
    }

    async fn list_columns(&self, board_id: BoardId) -> RepositoryResult<Vec<Column>> {
        let state = self.read_state()?;
        Ok(sorted_columns(&state, board_id))
    }

    async fn find_column_by_kind(
        &self,
        board_id: BoardId,
        kind: ColumnKind,
    ) -> RepositoryResult<Option<Column>> {
        let state = self.read_state()?;
        Ok(sorted_columns(&state, board_id)
            .into_iter()
            .find(|column| column.kind() == kind))
    }
}

#[async_trait]
impl CardRepository for InMemoryTaskboardRepository {
    async fn insert_card(&self, card: &Card) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        state.cards.insert(card.id(), card.clone());
        Ok(())
    }

    async fn update_card(&self, card: &Card) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.cards.contains_key(&card.id()) {
            return Err(RepositoryError::CardNotFound(card.id()));
        }
        state.cards.insert(card.id(), card.clone());
        Ok(())
    }

    async fn delete_card(&self, id: CardId) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.cards.contains_key(&id) {
            return Err(RepositoryError::CardNotFound(id));
        }
        remove_card(&mut state, id);
        Ok(())
    }

    async fn find_card(&self, id: CardId) -> RepositoryResult<Option<Card>> {
        let state = self.read_state()?;
        Ok(state.cards.get(&id).cloned())
    }

    async fn list_cards_by_column(&self, column_id: ColumnId) -> RepositoryResult<Vec<Card>> {
        let state = self.read_state()?;
        Ok(sorted_cards(&state, |card| card.column_id() == column_id))
    }

    async fn list_cards_by_board(&self, board_id: BoardId) -> RepositoryResult<Vec<Card>> {
        let state = self.read_state()?;
        let column_ids: Vec<ColumnId> = state
            .columns
            .values()
            .filter(|column| column.board_id() == board_id)
            .map(Column::id)
            .collect();
        Ok(sorted_cards(&state, |card| {
            column_ids.contains(&card.column_id())
        }))
    }

    async fn count_cards_in_column(&self, column_id: ColumnId) -> RepositoryResult<usize> {
        let state = self.read_state()?;
        Ok(state
            .cards
            .values()
            .filter(|card| card.column_id() == column_id)
            .count())
    }
}

#[async_trait]
impl BlockRepository for InMemoryTaskboardRepository {
    async fn insert_block(&self, block: &Block) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        let open_exists = state
            .blocks
            .values()
            .any(|existing| existing.card_id() == block.card_id() && existing.is_open());
        if block.is_open() && open_exists {
            return Err(RepositoryError::OpenBlockExists(block.card_id()));
        }
        state.blocks.insert(block.id(), block.clone());
        Ok(())
    }

    async fn update_block(&self, block: &Block) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.blocks.contains_key(&block.id()) {
            return Err(RepositoryError::BlockNotFound(block.id()));
        }
        state.blocks.insert(block.id(), block.clone());
        Ok(())
    }

    async fn find_block(&self, id: BlockId) -> RepositoryResult<Option<Block>> {
        let state = self.read_state()?;
        Ok(state.blocks.get(&id).cloned())
    }

    async fn find_open_block(&self, card_id: CardId) -> RepositoryResult<Option<Block>> {
        let state = self.read_state()?;
        Ok(state
            .blocks
            .values()
            .find(|block| block.card_id() == card_id && block.is_open())
            .cloned())
    }

    async fn list_blocks_by_card(&self, card_id: CardId) -> RepositoryResult<Vec<Block>> {
        let state = self.read_state()?;
        let mut blocks: Vec<Block> = state
            .blocks
            .values()
            .filter(|block| block.card_id() == card_id)
            .cloned()
            .collect();
        blocks.sort_by_key(|block| (block.blocked_at(), block.id().into_inner()));
        Ok(blocks)
    }

    async fn list_blocks_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        open_only: bool,
    ) -> RepositoryResult<Vec<Block>> {
        let state = self.read_state()?;
        let mut blocks: Vec<Block> = state
            .blocks
            .values()
            .filter(|block| block.blocked_at() >= start && block.blocked_at() <= end)
            .filter(|block| !open_only || block.is_open())
            .cloned()
            .collect();
        blocks.sort_by_key(|block| (block.blocked_at(), block.id().into_inner()));
        Ok(blocks)
    }
}
