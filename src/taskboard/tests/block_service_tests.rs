//! Service tests for the block/unblock lifecycle.

use super::support::TestHarness;
use crate::taskboard::{
    domain::{
        Block, BlockId, Board, BoardId, Card, CardId, ColumnId, TaskboardDomainError,
    },
    ports::{
        BlockRepository, CardRepository, RepositoryError, RepositoryResult,
    },
    services::{BlockService, ResourceKind, TaskboardError},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::sync::Arc;

#[fixture]
fn harness() -> TestHarness {
    TestHarness::new()
}

async fn card_on_fresh_board(harness: &TestHarness) -> eyre::Result<(Board, Card)> {
    let board = harness.boards.create("Sprint 1").await?;
    let card = harness.cards.create(board.id(), "Fix bug", None).await?;
    Ok((board, card))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn block_opens_a_block_and_marks_the_card_blocked(
    harness: TestHarness,
) -> eyre::Result<()> {
    let (_, card) = card_on_fresh_board(&harness).await?;

    let block = harness.blocks.block(card.id(), "waiting on design").await?;
    ensure!(block.is_open());
    ensure!(block.block_reason() == "waiting on design");
    ensure!(block.card_id() == card.id());
    ensure!(harness.blocks.is_blocked(card.id()).await?);

    let open = harness.blocks.open_block(card.id()).await?;
    ensure!(open.map(|open_block| open_block.id()) == Some(block.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn block_twice_conflicts_and_keeps_one_open_block(
    harness: TestHarness,
) -> eyre::Result<()> {
    let (_, card) = card_on_fresh_board(&harness).await?;
    harness.blocks.block(card.id(), "waiting on design").await?;

    let result = harness.blocks.block(card.id(), "another reason").await;
    let Err(TaskboardError::CardAlreadyBlocked(card_id)) = result else {
        bail!("expected already-blocked conflict, got {result:?}");
    };
    ensure!(card_id == card.id());

    let history = harness.blocks.blocks_of(card.id()).await?;
    ensure!(history.len() == 1);
    ensure!(history.iter().filter(|block| block.is_open()).count() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn block_on_a_missing_card_is_not_found(harness: TestHarness) {
    let result = harness.blocks.block(CardId::new(), "waiting on design").await;
    assert!(matches!(
        result,
        Err(TaskboardError::NotFound {
            resource: ResourceKind::Card,
            ..
        })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn block_rejects_blank_reasons(harness: TestHarness) -> eyre::Result<()> {
    let (_, card) = card_on_fresh_board(&harness).await?;
    let result = harness.blocks.block(card.id(), "   ").await;
    assert!(matches!(
        result,
        Err(TaskboardError::Domain(
            TaskboardDomainError::EmptyBlockReason
        ))
    ));
    ensure!(harness.blocks.blocks_of(card.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unblock_closes_the_open_block(harness: TestHarness) -> eyre::Result<()> {
    let (_, card) = card_on_fresh_board(&harness).await?;
    harness.blocks.block(card.id(), "waiting on design").await?;

    let closed = harness.blocks.unblock(card.id(), "design ready").await?;
    ensure!(!closed.is_open());
    ensure!(closed.unblock_reason() == Some("design ready"));
    ensure!(closed.unblocked_at().is_some());
    ensure!(!harness.blocks.is_blocked(card.id()).await?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unblock_of_a_never_blocked_card_is_refused(harness: TestHarness) -> eyre::Result<()> {
    let (_, card) = card_on_fresh_board(&harness).await?;

    let result = harness.blocks.unblock(card.id(), "design ready").await;
    let Err(TaskboardError::CardNotBlocked(card_id)) = result else {
        bail!("expected not-blocked rejection, got {result:?}");
    };
    ensure!(card_id == card.id());
    ensure!(harness.blocks.blocks_of(card.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn block_cycles_accumulate_history_with_at_most_one_open(
    harness: TestHarness,
) -> eyre::Result<()> {
    let (_, card) = card_on_fresh_board(&harness).await?;
    harness.blocks.block(card.id(), "waiting on design").await?;
    harness.blocks.unblock(card.id(), "design ready").await?;
    harness.blocks.block(card.id(), "ci outage").await?;

    let history = harness.blocks.blocks_of(card.id()).await?;
    ensure!(history.len() == 2);
    ensure!(history.iter().filter(|block| block.is_open()).count() == 1);
    ensure!(harness.blocks.is_blocked(card.id()).await?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn get_resolves_a_block_by_identifier(harness: TestHarness) -> eyre::Result<()> {
    let (_, card) = card_on_fresh_board(&harness).await?;
    let block = harness.blocks.block(card.id(), "waiting on design").await?;

    let fetched = harness.blocks.get(block.id()).await?;
    ensure!(fetched.id() == block.id());

    let missing = harness.blocks.get(BlockId::new()).await;
    assert!(matches!(
        missing,
        Err(TaskboardError::NotFound {
            resource: ResourceKind::Block,
            ..
        })
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn storage_constraint_surfaces_a_racing_double_block_as_the_same_conflict(
    harness: TestHarness,
) -> eyre::Result<()> {
    let (_, card) = card_on_fresh_board(&harness).await?;
    let clock = DefaultClock;
    let first = Block::new(card.id(), "waiting on design", &clock)?;
    harness.repository.insert_block(&first).await?;

    // A writer that raced past the service pre-check hits the storage
    // constraint instead, and the mapping folds it into the same error the
    // sequential path produces.
    let second = Block::new(card.id(), "another reason", &clock)?;
    let result = harness.repository.insert_block(&second).await;
    let Err(constraint_violation) = result else {
        bail!("expected the open-block constraint to reject the insert");
    };
    assert!(matches!(
        constraint_violation,
        RepositoryError::OpenBlockExists(_)
    ));
    assert!(matches!(
        TaskboardError::from(constraint_violation),
        TaskboardError::CardAlreadyBlocked(_)
    ));
    Ok(())
}

mockall::mock! {
    Repo {}

    #[async_trait]
    impl CardRepository for Repo {
        async fn insert_card(&self, card: &Card) -> RepositoryResult<()>;
        async fn update_card(&self, card: &Card) -> RepositoryResult<()>;
        async fn delete_card(&self, id: CardId) -> RepositoryResult<()>;
        async fn find_card(&self, id: CardId) -> RepositoryResult<Option<Card>>;
        async fn list_cards_by_column(&self, column_id: ColumnId) -> RepositoryResult<Vec<Card>>;
        async fn list_cards_by_board(&self, board_id: BoardId) -> RepositoryResult<Vec<Card>>;
        async fn count_cards_in_column(&self, column_id: ColumnId) -> RepositoryResult<usize>;
    }

    #[async_trait]
    impl BlockRepository for Repo {
        async fn insert_block(&self, block: &Block) -> RepositoryResult<()>;
        async fn update_block(&self, block: &Block) -> RepositoryResult<()>;
        async fn find_block(&self, id: BlockId) -> RepositoryResult<Option<Block>>;
        async fn find_open_block(&self, card_id: CardId) -> RepositoryResult<Option<Block>>;
        async fn list_blocks_by_card(&self, card_id: CardId) -> RepositoryResult<Vec<Block>>;
        async fn list_blocks_in_range(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
            open_only: bool,
        ) -> RepositoryResult<Vec<Block>>;
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn persistence_failures_propagate_unchanged() {
    let mut repository = MockRepo::new();
    repository.expect_find_open_block().returning(|_| {
        Err(RepositoryError::persistence(std::io::Error::other(
            "connection reset",
        )))
    });
    let service = BlockService::new(Arc::new(repository), Arc::new(DefaultClock));

    let result = service.is_blocked(CardId::new()).await;
    assert!(matches!(result, Err(TaskboardError::Repository(_))));
}
