//! Block lifecycle service: block, unblock, and history accessors.

use crate::taskboard::{
    domain::{Block, BlockId, CardId},
    ports::{BlockRepository, CardRepository},
};
use mockable::Clock;
use std::sync::Arc;

use super::error::{ResourceKind, TaskboardError, TaskboardResult};

/// Block lifecycle orchestration service.
///
/// A card alternates strictly between open (no active block) and blocked
/// (exactly one open block); the history of past cycles is kept forever.
#[derive(Clone)]
pub struct BlockService<R, C>
where
    R: CardRepository + BlockRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> BlockService<R, C>
where
    R: CardRepository + BlockRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new block service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Blocks a card.
    ///
    /// The open-block conflict is checked before any other card state is
    /// loaded, and the storage constraint turns a concurrent double-block
    /// into the same conflict for the losing writer.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::CardAlreadyBlocked`] when an open block
    /// exists, [`TaskboardError::NotFound`] when the card is missing, and
    /// [`TaskboardError::Domain`] when the reason is blank.
    pub async fn block(
        &self,
        card_id: CardId,
        reason: impl Into<String>,
    ) -> TaskboardResult<Block> {
        if self.repository.find_open_block(card_id).await?.is_some() {
            return Err(TaskboardError::CardAlreadyBlocked(card_id));
        }
        if self.repository.find_card(card_id).await?.is_none() {
            return Err(TaskboardError::NotFound {
                resource: ResourceKind::Card,
                id: card_id.into_inner(),
            });
        }
        let block = Block::new(card_id, reason, &*self.clock)?;
        self.repository.insert_block(&block).await?;
        tracing::info!(
            card_id = %card_id,
            block_id = %block.id(),
            reason = block.block_reason(),
            "blocked card"
        );
        Ok(block)
    }

    /// Unblocks a card by closing its open block.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::CardNotBlocked`] when no open block exists
    /// and [`TaskboardError::Domain`] when the reason is blank.
    pub async fn unblock(
        &self,
        card_id: CardId,
        reason: impl Into<String>,
    ) -> TaskboardResult<Block> {
        let block = release_open_block(self.repository.as_ref(), card_id, reason, &*self.clock)
            .await?;
        tracing::info!(card_id = %card_id, block_id = %block.id(), "unblocked card");
        Ok(block)
    }

    /// Returns `true` when the card currently has an open block.
    ///
    /// Pure query: derived from the block history, never stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::Repository`] when the lookup fails.
    pub async fn is_blocked(&self, card_id: CardId) -> TaskboardResult<bool> {
        Ok(self.repository.find_open_block(card_id).await?.is_some())
    }

    /// Retrieves a block by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::NotFound`] when the block does not exist.
    pub async fn get(&self, id: BlockId) -> TaskboardResult<Block> {
        self.repository
            .find_block(id)
            .await?
            .ok_or(TaskboardError::NotFound {
                resource: ResourceKind::Block,
                id: id.into_inner(),
            })
    }

    /// Returns the card's full block history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::Repository`] when the lookup fails.
    pub async fn blocks_of(&self, card_id: CardId) -> TaskboardResult<Vec<Block>> {
        Ok(self.repository.list_blocks_by_card(card_id).await?)
    }

    /// Returns the card's open block, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardError::Repository`] when the lookup fails.
    pub async fn open_block(&self, card_id: CardId) -> TaskboardResult<Option<Block>> {
        Ok(self.repository.find_open_block(card_id).await?)
    }
}

/// Closes the card's open block through the regular unblock path.
///
/// Shared with card cancellation, which force-closes any open block with a
/// fixed system reason before moving the card.
pub(super) async fn release_open_block<R>(
    repository: &R,
    card_id: CardId,
    reason: impl Into<String>,
    clock: &impl Clock,
) -> TaskboardResult<Block>
where
    R: BlockRepository,
{
    let mut block = repository
        .find_open_block(card_id)
        .await?
        .ok_or(TaskboardError::CardNotBlocked(card_id))?;
    block.close(reason, clock)?;
    repository.update_block(&block).await?;
    Ok(block)
}
