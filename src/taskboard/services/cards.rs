//! Card service: creation into the initial column, movement, and
//! cancellation.

use crate::taskboard::{
    domain::{BoardId, Card, CardId, ColumnId, ColumnKind},
    ports::{BlockRepository, BoardRepository, CardRepository, ColumnRepository},
};
use mockable::Clock;
use std::sync::Arc;

use super::blocks::release_open_block;
use super::boards::require_special_column;
use super::error::{ResourceKind, TaskboardError, TaskboardResult};

/// Reason recorded when cancellation force-closes an open block.
const CANCEL_UNBLOCK_REASON: &str = "Card canceled";

/// Card movement orchestration service.
#[derive(Clone)]
pub struct CardService<R, C>
where
    R: BoardRepository + ColumnRepository + CardRepository + BlockRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> CardService<R, C>
where
    R: BoardRepository + ColumnRepository + CardRepository + BlockRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new card service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Retrieves a card by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the card does not exist.
    pub async fn get(&self, id: CardId) -> TaskboardResult<Card> {
        self.repository
            .find_card(id)
            .await?
            .ok_or(TaskboardError::NotFound {
                resource: ResourceKind::Card,
                id: id.into_inner(),
            })
    }

    /// Returns the column's cards, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::Repository`] when the lookup fails.
    pub async fn list_by_column(&self, column_id: ColumnId) -> TaskboardResult<Vec<Card>> {
        Ok(self.repository.list_cards_by_column(column_id).await?)
    }

    /// Returns every card on the board, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::Repository`] when the lookup fails.
    pub async fn list_by_board(&self, board_id: BoardId) -> TaskboardResult<Vec<Card>> {
        Ok(self.repository.list_cards_by_board(board_id).await?)
    }

    /// Creates a card in the board's INITIAL column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the board does not exist,
    /// [`TaskboardError::MissingSpecialColumn`] when the board lacks an
    /// INITIAL column, and [`TaskboardError::Domain`] when the title is
    /// blank.
    pub async fn create(
        &self,
        board_id: BoardId,
        title: impl Into<String>,
        description: Option<String>,
    ) -> TaskboardResult<Card> {
        if self.repository.find_board(board_id).await?.is_none() {
            return Err(TaskboardError::NotFound {
                resource: ResourceKind::Board,
                id: board_id.into_inner(),
            });
        }
        let initial =
            require_special_column(self.repository.as_ref(), board_id, ColumnKind::Initial)
                .await?;
        let card = Card::new(initial.id(), title, description, &*self.clock)?;
        self.repository.insert_card(&card).await?;
        tracing::info!(card_id = %card.id(), board_id = %board_id, "created card");
        Ok(card)
    }

    /// Overwrites the card's title and description and touches
    /// `updated_at`. Both fields are always replaced.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the card does not exist
    /// and [`TaskboardError::Domain`] when the title is blank.
    pub async fn update(
        &self,
        id: CardId,
        title: impl Into<String>,
        description: Option<String>,
    ) -> TaskboardResult<Card> {
        let mut card = self.get(id).await?;
        card.update_details(title, description, &*self.clock)?;
        self.repository.update_card(&card).await?;
        Ok(card)
    }

    /// Moves a card to another column.
    ///
    /// Blocked cards may never change column through this path; nothing is
    /// mutated when the guard fires.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the card or the target
    /// column is missing and [`TaskboardError::BlockedCard`] when the card
    /// has an open block.
    pub async fn move_card(
        &self,
        id: CardId,
        target_column_id: ColumnId,
    ) -> TaskboardResult<Card> {
        let mut card = self.get(id).await?;
        let target = self
            .repository
            .find_column(target_column_id)
            .await?
            .ok_or(TaskboardError::NotFound {
                resource: ResourceKind::Column,
                id: target_column_id.into_inner(),
            })?;
        if self.repository.find_open_block(id).await?.is_some() {
            return Err(TaskboardError::BlockedCard(id));
        }
        card.move_to(target.id(), &*self.clock);
        self.repository.update_card(&card).await?;
        tracing::info!(card_id = %id, column_id = %target_column_id, "moved card");
        Ok(card)
    }

    /// Cancels a card: force-closes any open block through the regular
    /// unblock path with a fixed system reason, then moves the card to the
    /// board's CANCEL column. Unlike [`Self::move_card`], cancellation is
    /// never rejected because of blocking.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the card (or its current
    /// column) is missing and [`TaskboardError::MissingSpecialColumn`] when
    /// the board lacks a CANCEL column.
    pub async fn cancel(&self, id: CardId) -> TaskboardResult<Card> {
        let mut card = self.get(id).await?;
        let column = self
            .repository
            .find_column(card.column_id())
            .await?
            .ok_or(TaskboardError::NotFound {
                resource: ResourceKind::Column,
                id: card.column_id().into_inner(),
            })?;
        let cancel_column = require_special_column(
            self.repository.as_ref(),
            column.board_id(),
            ColumnKind::Cancel,
        )
        .await?;
        if self.repository.find_open_block(id).await?.is_some() {
            release_open_block(
                self.repository.as_ref(),
                id,
                CANCEL_UNBLOCK_REASON,
                &*self.clock,
            )
            .await?;
        }
        card.move_to(cancel_column.id(), &*self.clock);
        self.repository.update_card(&card).await?;
        tracing::info!(card_id = %id, column_id = %cancel_column.id(), "canceled card");
        Ok(card)
    }

    /// Deletes a card together with its block history.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the card does not exist.
    pub async fn delete(&self, id: CardId) -> TaskboardResult<()> {
        self.repository.delete_card(id).await?;
        tracing::info!(card_id = %id, "deleted card");
        Ok(())
    }
}
