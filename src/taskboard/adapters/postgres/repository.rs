//! `PostgreSQL` repository implementation for taskboard storage.

use super::{
    models::{
        BlockRow, BoardRow, CardRow, ColumnRow, NewBlockRow, NewBoardRow, NewCardRow,
        NewColumnRow,
    },
    schema::{blocks, board_columns, boards, cards},
};
use crate::taskboard::{
    domain::{
        Block, BlockId, Board, BoardId, Card, CardId, Column, ColumnId, ColumnKind,
        PersistedBlockData, PersistedBoardData, PersistedCardData, PersistedColumnData,
    },
    ports::{
        BlockRepository, BoardRepository, CardRepository, ColumnRepository, RepositoryError,
        RepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by taskboard adapters.
pub type TaskboardPgPool = Pool<ConnectionManager<PgConnection>>;

/// Partial unique index enforcing one special column per kind per board.
const SPECIAL_KIND_CONSTRAINT: &str = "idx_board_columns_special_kind_unique";

/// Partial unique index enforcing at most one open block per card.
const OPEN_BLOCK_CONSTRAINT: &str = "idx_blocks_open_per_card_unique";

/// `PostgreSQL`-backed taskboard repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskboardRepository {
    pool: TaskboardPgPool,
}

impl PostgresTaskboardRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskboardPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(RepositoryError::persistence)?
    }
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl BoardRepository for PostgresTaskboardRepository {
    async fn insert_board(&self, board: &Board) -> RepositoryResult<()> {
        let new_row = board_to_new_row(board);
        self.run_blocking(move |connection| {
            diesel::insert_into(boards::table)
                .values(&new_row)
                .execute(connection)?;
            Ok(())
        })
        .await
    }

    async fn update_board(&self, board: &Board) -> RepositoryResult<()> {
        let board_id = board.id();
        let new_row = board_to_new_row(board);
        self.run_blocking(move |connection| {
            let updated = diesel::update(boards::table.find(new_row.id))
                .set(&new_row)
                .execute(connection)?;
            if updated == 0 {
                return Err(RepositoryError::BoardNotFound(board_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_board(&self, id: BoardId) -> RepositoryResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction(|connection| {
                let column_ids: Vec<uuid::Uuid> = board_columns::table
                    .filter(board_columns::board_id.eq(id.into_inner()))
                    .select(board_columns::id)
                    .load(connection)?;
                delete_cards_of_columns(connection, &column_ids)?;
                diesel::delete(
                    board_columns::table.filter(board_columns::id.eq_any(column_ids)),
                )
                .execute(connection)?;
                let deleted =
                    diesel::delete(boards::table.find(id.into_inner())).execute(connection)?;
                if deleted == 0 {
                    return Err(RepositoryError::BoardNotFound(id));
                }
                Ok(())
            })
        })
        .await
    }

    async fn find_board(&self, id: BoardId) -> RepositoryResult<Option<Board>> {
        self.run_blocking(move |connection| {
            let row = boards::table
                .find(id.into_inner())
                .select(BoardRow::as_select())
                .first::<BoardRow>(connection)
                .optional()?;
            Ok(row.map(row_to_board))
        })
        .await
    }

    async fn list_boards(&self) -> RepositoryResult<Vec<Board>> {
        self.run_blocking(move |connection| {
            let rows = boards::table
                .order((boards::name.asc(), boards::id.asc()))
                .select(BoardRow::as_select())
                .load::<BoardRow>(connection)?;
            Ok(rows.into_iter().map(row_to_board).collect())
        })
        .await
    }
}

#[async_trait]
impl ColumnRepository for PostgresTaskboardRepository {
    async fn insert_column(&self, column: &Column) -> RepositoryResult<()> {
        let board_id = column.board_id();
        let kind = column.kind();
        let new_row = column_to_new_row(column);
        self.run_blocking(move |connection| {
            diesel::insert_into(board_columns::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| map_column_unique_violation(err, board_id, kind))?;
            Ok(())
        })
        .await
    }

    async fn update_column(&self, column: &Column) -> RepositoryResult<()> {
        let column_id = column.id();
        let board_id = column.board_id();
        let kind = column.kind();
        let new_row = column_to_new_row(column);
        self.run_blocking(move |connection| {
            let updated = diesel::update(board_columns::table.find(new_row.id))
                .set(&new_row)
                .execute(connection)
                .map_err(|err| map_column_unique_violation(err, board_id, kind))?;
            if updated == 0 {
                return Err(RepositoryError::ColumnNotFound(column_id));
            }
            Ok(())
        })
        .await
    }

    async fn update_column_orders(
        &self,
        board_id: BoardId,
        assignments: &[(ColumnId, i32)],
    ) -> RepositoryResult<()> {
        let batch: Vec<(ColumnId, i32)> = assignments.to_vec();
        self.run_blocking(move |connection| {
            connection.transaction(|connection| {
                for (column_id, order) in &batch {
                    let updated = diesel::update(
                        board_columns::table
                            .find(column_id.into_inner())
                            .filter(board_columns::board_id.eq(board_id.into_inner())),
                    )
                    .set(board_columns::column_order.eq(*order))
                    .execute(connection)?;
                    if updated == 0 {
                        return Err(RepositoryError::ColumnNotFound(*column_id));
                    }
                }
                Ok(())
            })
        })
        .await
    }

    async fn delete_column(&self, id: ColumnId) -> RepositoryResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction(|connection| {
                delete_cards_of_columns(connection, &[id.into_inner()])?;
                let deleted = diesel::delete(board_columns::table.find(id.into_inner()))
                    .execute(connection)?;
                if deleted == 0 {
                    return Err(RepositoryError::ColumnNotFound(id));
                }
                Ok(())
            })
        })
        .await
    }

    async fn find_column(&self, id: ColumnId) -> RepositoryResult<Option<Column>> {
        self.run_blocking(move |connection| {
            let row = board_columns::table
                .find(id.into_inner())
                .select(ColumnRow::as_select())
                .first::<ColumnRow>(connection)
                .optional()?;
            row.map(row_to_column).transpose()
        })
        .await
    }

    async fn list_columns(&self, board_id: BoardId) -> RepositoryResult<Vec<Column>> {
        self.run_blocking(move |connection| {
            let rows = board_columns::table
                .filter(board_columns::board_id.eq(board_id.into_inner()))
                .order((
                    board_columns::column_order.asc(),
                    board_columns::id.asc(),
                ))
                .select(ColumnRow::as_select())
                .load::<ColumnRow>(connection)?;
            rows.into_iter().map(row_to_column).collect()
        })
        .await
    }

    async fn find_column_by_kind(
        &self,
        board_id: BoardId,
        kind: ColumnKind,
    ) -> RepositoryResult<Option<Column>> {
        self.run_blocking(move |connection| {
            let row = board_columns::table
                .filter(board_columns::board_id.eq(board_id.into_inner()))
                .filter(board_columns::kind.eq(kind.as_str()))
                .order((
                    board_columns::column_order.asc(),
                    board_columns::id.asc(),
                ))
                .select(ColumnRow::as_select())
                .first::<ColumnRow>(connection)
                .optional()?;
            row.map(row_to_column).transpose()
        })
        .await
    }
}

#[async_trait]
impl CardRepository for PostgresTaskboardRepository {
    async fn insert_card(&self, card: &Card) -> RepositoryResult<()> {
        let new_row = card_to_new_row(card);
        self.run_blocking(move |connection| {
            diesel::insert_into(cards::table)
                .values(&new_row)
                .execute(connection)?;
            Ok(())
        })
        .await
    }

    async fn update_card(&self, card: &Card) -> RepositoryResult<()> {
        let card_id = card.id();
        let new_row = card_to_new_row(card);
        self.run_blocking(move |connection| {
            let updated = diesel::update(cards::table.find(new_row.id))
                .set(&new_row)
                .execute(connection)?;
            if updated == 0 {
                return Err(RepositoryError::CardNotFound(card_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_card(&self, id: CardId) -> RepositoryResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction(|connection| {
                diesel::delete(blocks::table.filter(blocks::card_id.eq(id.into_inner())))
                    .execute(connection)?;
                let deleted =
                    diesel::delete(cards::table.find(id.into_inner())).execute(connection)?;
                if deleted == 0 {
                    return Err(RepositoryError::CardNotFound(id));
                }
                Ok(())
            })
        })
        .await
    }

    async fn find_card(&self, id: CardId) -> RepositoryResult<Option<Card>> {
        self.run_blocking(move |connection| {
            let row = cards::table
                .find(id.into_inner())
                .select(CardRow::as_select())
                .first::<CardRow>(connection)
                .optional()?;
            Ok(row.map(row_to_card))
        })
        .await
    }

    async fn list_cards_by_column(&self, column_id: ColumnId) -> RepositoryResult<Vec<Card>> {
        self.run_blocking(move |connection| {
            let rows = cards::table
                .filter(cards::board_column_id.eq(column_id.into_inner()))
                .order((cards::created_at.asc(), cards::id.asc()))
                .select(CardRow::as_select())
                .load::<CardRow>(connection)?;
            Ok(rows.into_iter().map(row_to_card).collect())
        })
        .await
    }

    async fn list_cards_by_board(&self, board_id: BoardId) -> RepositoryResult<Vec<Card>> {
        self.run_blocking(move |connection| {
            let rows = cards::table
                .inner_join(board_columns::table)
                .filter(board_columns::board_id.eq(board_id.into_inner()))
                .order((cards::created_at.asc(), cards::id.asc()))
                .select(CardRow::as_select())
                .load::<CardRow>(connection)?;
            Ok(rows.into_iter().map(row_to_card).collect())
        })
        .await
    }

    async fn count_cards_in_column(&self, column_id: ColumnId) -> RepositoryResult<usize> {
        self.run_blocking(move |connection| {
            let count: i64 = cards::table
                .filter(cards::board_column_id.eq(column_id.into_inner()))
                .count()
                .get_result(connection)?;
            usize::try_from(count).map_err(RepositoryError::persistence)
        })
        .await
    }
}

#[async_trait]
impl BlockRepository for PostgresTaskboardRepository {
    async fn insert_block(&self, block: &Block) -> RepositoryResult<()> {
        let card_id = block.card_id();
        let new_row = block_to_new_row(block);
        self.run_blocking(move |connection| {
            diesel::insert_into(blocks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_constraint(info.as_ref(), OPEN_BLOCK_CONSTRAINT) =>
                    {
                        RepositoryError::OpenBlockExists(card_id)
                    }
                    other => RepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_block(&self, block: &Block) -> RepositoryResult<()> {
        let block_id = block.id();
        let new_row = block_to_new_row(block);
        self.run_blocking(move |connection| {
            let updated = diesel::update(blocks::table.find(new_row.id))
                .set(&new_row)
                .execute(connection)?;
            if updated == 0 {
                return Err(RepositoryError::BlockNotFound(block_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_block(&self, id: BlockId) -> RepositoryResult<Option<Block>> {
        self.run_blocking(move |connection| {
            let row = blocks::table
                .find(id.into_inner())
                .select(BlockRow::as_select())
                .first::<BlockRow>(connection)
                .optional()?;
            Ok(row.map(row_to_block))
        })
        .await
    }

    async fn find_open_block(&self, card_id: CardId) -> RepositoryResult<Option<Block>> {
        self.run_blocking(move |connection| {
            let row = blocks::table
                .filter(blocks::card_id.eq(card_id.into_inner()))
                .filter(blocks::unblocked_at.is_null())
                .select(BlockRow::as_select())
                .first::<BlockRow>(connection)
                .optional()?;
            Ok(row.map(row_to_block))
        })
        .await
    }

    async fn list_blocks_by_card(&self, card_id: CardId) -> RepositoryResult<Vec<Block>> {
        self.run_blocking(move |connection| {
            let rows = blocks::table
                .filter(blocks::card_id.eq(card_id.into_inner()))
                .order((blocks::blocked_at.asc(), blocks::id.asc()))
                .select(BlockRow::as_select())
                .load::<BlockRow>(connection)?;
            Ok(rows.into_iter().map(row_to_block).collect())
        })
        .await
    }

    async fn list_blocks_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        open_only: bool,
    ) -> RepositoryResult<Vec<Block>> {
        self.run_blocking(move |connection| {
            let mut query = blocks::table
                .filter(blocks::blocked_at.ge(start))
                .filter(blocks::blocked_at.le(end))
                .select(BlockRow::as_select())
                .into_boxed();
            if open_only {
                query = query.filter(blocks::unblocked_at.is_null());
            }
            let rows = query
                .order((blocks::blocked_at.asc(), blocks::id.asc()))
                .load::<BlockRow>(connection)?;
            Ok(rows.into_iter().map(row_to_block).collect())
        })
        .await
    }
}

/// Deletes the cards of the given columns together with their blocks.
fn delete_cards_of_columns(
    connection: &mut PgConnection,
    column_ids: &[uuid::Uuid],
) -> Result<(), DieselError> {
    let card_ids: Vec<uuid::Uuid> = cards::table
        .filter(cards::board_column_id.eq_any(column_ids))
        .select(cards::id)
        .load(connection)?;
    diesel::delete(blocks::table.filter(blocks::card_id.eq_any(&card_ids)))
        .execute(connection)?;
    diesel::delete(cards::table.filter(cards::id.eq_any(&card_ids))).execute(connection)?;
    Ok(())
}

fn map_column_unique_violation(
    err: DieselError,
    board_id: BoardId,
    kind: ColumnKind,
) -> RepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_constraint(info.as_ref(), SPECIAL_KIND_CONSTRAINT) =>
        {
            RepositoryError::DuplicateSpecialColumn { board_id, kind }
        }
        other => RepositoryError::persistence(other),
    }
}

fn is_constraint(info: &dyn DatabaseErrorInformation, name: &str) -> bool {
    info.constraint_name().is_some_and(|found| found == name)
}

fn board_to_new_row(board: &Board) -> NewBoardRow {
    NewBoardRow {
        id: board.id().into_inner(),
        name: board.name().to_owned(),
    }
}

fn row_to_board(row: BoardRow) -> Board {
    Board::from_persisted(PersistedBoardData {
        id: BoardId::from_uuid(row.id),
        name: row.name,
    })
}

fn column_to_new_row(column: &Column) -> NewColumnRow {
    NewColumnRow {
        id: column.id().into_inner(),
        board_id: column.board_id().into_inner(),
        name: column.name().to_owned(),
        column_order: column.order(),
        kind: column.kind().as_str().to_owned(),
    }
}

fn row_to_column(row: ColumnRow) -> RepositoryResult<Column> {
    let kind = ColumnKind::try_from(row.kind.as_str()).map_err(RepositoryError::persistence)?;
    Ok(Column::from_persisted(PersistedColumnData {
        id: ColumnId::from_uuid(row.id),
        board_id: BoardId::from_uuid(row.board_id),
        name: row.name,
        order: row.column_order,
        kind,
    }))
}

fn card_to_new_row(card: &Card) -> NewCardRow {
    NewCardRow {
        id: card.id().into_inner(),
        board_column_id: card.column_id().into_inner(),
        title: card.title().to_owned(),
        description: card.description().map(str::to_owned),
        created_at: card.created_at(),
        updated_at: card.updated_at(),
    }
}

fn row_to_card(row: CardRow) -> Card {
    Card::from_persisted(PersistedCardData {
        id: CardId::from_uuid(row.id),
        column_id: ColumnId::from_uuid(row.board_column_id),
        title: row.title,
        description: row.description,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn block_to_new_row(block: &Block) -> NewBlockRow {
    NewBlockRow {
        id: block.id().into_inner(),
        card_id: block.card_id().into_inner(),
        blocked_at: block.blocked_at(),
        block_reason: block.block_reason().to_owned(),
        unblocked_at: block.unblocked_at(),
        unblock_reason: block.unblock_reason().map(str::to_owned),
    }
}

fn row_to_block(row: BlockRow) -> Block {
    Block::from_persisted(PersistedBlockData {
        id: BlockId::from_uuid(row.id),
        card_id: CardId::from_uuid(row.card_id),
        blocked_at: row.blocked_at,
        block_reason: row.block_reason,
        unblocked_at: row.unblocked_at,
        unblock_reason: row.unblock_reason,
    })
}
