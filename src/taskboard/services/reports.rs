//! Read-only reporting derivations over the taskboard graph.
//!
//! Everything here is computed from the repository accessors; no invariant
//! is enforced and nothing is mutated. Consumers that need richer analytics
//! can build on the same port surface.

use crate::taskboard::{
    domain::{Block, BoardId, Card},
    ports::{BlockRepository, BoardRepository, CardRepository, ColumnRepository},
};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;

use super::error::TaskboardResult;

/// Card and block activity over a reporting period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityReport {
    /// Period start (inclusive).
    pub start: DateTime<Utc>,
    /// Period end (inclusive).
    pub end: DateTime<Utc>,
    /// Blocks opened during the period.
    pub total_blocks: usize,
    /// Blocks opened during the period and still open.
    pub open_blocks: usize,
    /// Most frequent block reasons in the period, most common first.
    pub common_reasons: Vec<(String, usize)>,
}

/// Workflow snapshot of a single board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardEfficiencyReport {
    /// The reported board.
    pub board_id: BoardId,
    /// Cards per column name, in display order.
    pub card_distribution: Vec<(String, usize)>,
    /// Names of columns currently holding blocked cards, in display order.
    pub columns_with_blocked_cards: Vec<String>,
    /// Average duration of closed blocks on the board, when any exist.
    pub average_block_duration: Option<TimeDelta>,
    /// Total cards on the board.
    pub total_cards: usize,
}

/// Reporting service over boards, columns, cards, and blocks.
#[derive(Clone)]
pub struct ReportService<R, C>
where
    R: BoardRepository + ColumnRepository + CardRepository + BlockRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> ReportService<R, C>
where
    R: BoardRepository + ColumnRepository + CardRepository + BlockRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new report service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Returns blocks opened inside the inclusive range, optionally only
    /// those still open.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskboardError::Repository`] when the lookup fails.
    pub async fn blocks_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        open_only: bool,
    ) -> TaskboardResult<Vec<Block>> {
        Ok(self
            .repository
            .list_blocks_in_range(start, end, open_only)
            .await?)
    }

    /// Returns the most frequent block reasons across all boards, most
    /// common first, ties broken alphabetically.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskboardError::Repository`] when a lookup fails.
    pub async fn most_common_block_reasons(
        &self,
        limit: usize,
    ) -> TaskboardResult<Vec<(String, usize)>> {
        let blocks = self.all_blocks().await?;
        Ok(rank_reasons(&blocks, limit))
    }

    /// Returns the average duration of closed blocks per board. Boards
    /// whose cards were never blocked (or only have open blocks) are
    /// absent from the result.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskboardError::Repository`] when a lookup fails.
    pub async fn average_block_duration_by_board(
        &self,
    ) -> TaskboardResult<Vec<(BoardId, TimeDelta)>> {
        let mut averages = Vec::new();
        for board in self.repository.list_boards().await? {
            if let Some(average) = self.average_block_duration(board.id()).await? {
                averages.push((board.id(), average));
            }
        }
        Ok(averages)
    }

    /// Returns the average duration of the board's closed blocks, when any
    /// exist. Open blocks are excluded: their final duration is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskboardError::Repository`] when a lookup fails.
    pub async fn average_block_duration(
        &self,
        board_id: BoardId,
    ) -> TaskboardResult<Option<TimeDelta>> {
        let blocks = self.blocks_of_board(board_id).await?;
        let closed: Vec<TimeDelta> = blocks
            .iter()
            .filter(|block| !block.is_open())
            .map(|block| block.duration_until(self.clock.utc()))
            .collect();
        let count = i32::try_from(closed.len()).unwrap_or(i32::MAX);
        if count == 0 {
            return Ok(None);
        }
        let total = closed
            .iter()
            .fold(TimeDelta::zero(), |acc, duration| acc + *duration);
        Ok(Some(total / count))
    }

    /// Returns blocks in effect at least `min_duration`: open blocks older
    /// than the threshold and closed blocks whose full span reached it,
    /// longest first.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskboardError::Repository`] when a lookup fails.
    pub async fn long_duration_blocks(
        &self,
        min_duration: TimeDelta,
    ) -> TaskboardResult<Vec<Block>> {
        let now = self.clock.utc();
        let mut long: Vec<Block> = self
            .all_blocks()
            .await?
            .into_iter()
            .filter(|block| block.duration_until(now) >= min_duration)
            .collect();
        long.sort_by_key(|block| std::cmp::Reverse(block.duration_until(now)));
        Ok(long)
    }

    /// Returns the number of cards per column name, in display order.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskboardError::Repository`] when a lookup fails.
    pub async fn card_distribution(
        &self,
        board_id: BoardId,
    ) -> TaskboardResult<Vec<(String, usize)>> {
        let mut distribution = Vec::new();
        for column in self.repository.list_columns(board_id).await? {
            let count = self.repository.count_cards_in_column(column.id()).await?;
            distribution.push((column.name().to_owned(), count));
        }
        Ok(distribution)
    }

    /// Returns the names of the board's columns currently holding blocked
    /// cards, in display order.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskboardError::Repository`] when a lookup fails.
    pub async fn columns_with_blocked_cards(
        &self,
        board_id: BoardId,
    ) -> TaskboardResult<Vec<String>> {
        let mut names = Vec::new();
        for column in self.repository.list_columns(board_id).await? {
            let cards = self.repository.list_cards_by_column(column.id()).await?;
            if self.any_blocked(&cards).await? {
                names.push(column.name().to_owned());
            }
        }
        Ok(names)
    }

    /// Summarizes block activity over a reporting period.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskboardError::Repository`] when a lookup fails.
    pub async fn activity_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        reason_limit: usize,
    ) -> TaskboardResult<ActivityReport> {
        let blocks = self
            .repository
            .list_blocks_in_range(start, end, false)
            .await?;
        let open_blocks = blocks.iter().filter(|block| block.is_open()).count();
        let common_reasons = rank_reasons(&blocks, reason_limit);
        Ok(ActivityReport {
            start,
            end,
            total_blocks: blocks.len(),
            open_blocks,
            common_reasons,
        })
    }

    /// Compiles the per-board workflow snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskboardError::Repository`] when a lookup fails.
    pub async fn board_efficiency(
        &self,
        board_id: BoardId,
    ) -> TaskboardResult<BoardEfficiencyReport> {
        let card_distribution = self.card_distribution(board_id).await?;
        let columns_with_blocked_cards = self.columns_with_blocked_cards(board_id).await?;
        let average_block_duration = self.average_block_duration(board_id).await?;
        let total_cards = card_distribution.iter().map(|(_, count)| count).sum();
        Ok(BoardEfficiencyReport {
            board_id,
            card_distribution,
            columns_with_blocked_cards,
            average_block_duration,
            total_cards,
        })
    }

    /// Collects the block history of every card on the board.
    async fn blocks_of_board(&self, board_id: BoardId) -> TaskboardResult<Vec<Block>> {
        let mut blocks = Vec::new();
        for card in self.repository.list_cards_by_board(board_id).await? {
            blocks.extend(self.repository.list_blocks_by_card(card.id()).await?);
        }
        Ok(blocks)
    }

    /// Collects the block history of every board.
    async fn all_blocks(&self) -> TaskboardResult<Vec<Block>> {
        let mut blocks = Vec::new();
        for board in self.repository.list_boards().await? {
            blocks.extend(self.blocks_of_board(board.id()).await?);
        }
        Ok(blocks)
    }

    /// Returns `true` when any of the cards has an open block.
    async fn any_blocked(&self, cards: &[Card]) -> TaskboardResult<bool> {
        for card in cards {
            if self.repository.find_open_block(card.id()).await?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Counts reasons and ranks them most-common first, ties broken
/// alphabetically, truncated to `limit`.
fn rank_reasons(blocks: &[Block], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for block in blocks {
        *counts.entry(block.block_reason()).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(reason, count)| (reason.to_owned(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}
