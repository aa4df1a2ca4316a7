//! Service tests for board lifecycle and special-column lookups.

use super::support::TestHarness;
use crate::taskboard::{
    domain::{Board, ColumnKind, TaskboardDomainError},
    ports::{BlockRepository, BoardRepository, CardRepository},
    services::{ResourceKind, TaskboardError},
};
use eyre::ensure;
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> TestHarness {
    TestHarness::new()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_provisions_default_columns(harness: TestHarness) -> eyre::Result<()> {
    let board = harness.boards.create("Sprint 1").await?;
    let columns = harness.columns.list(board.id()).await?;

    let summary: Vec<(i32, String, ColumnKind)> = columns
        .iter()
        .map(|column| (column.order(), column.name().to_owned(), column.kind()))
        .collect();
    ensure!(
        summary
            == vec![
                (1, "Backlog".to_owned(), ColumnKind::Initial),
                (2, "To Do".to_owned(), ColumnKind::Pending),
                (3, "In Progress".to_owned(), ColumnKind::Pending),
                (4, "Done".to_owned(), ColumnKind::Final),
                (5, "Canceled".to_owned(), ColumnKind::Cancel),
            ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_rejects_blank_name(harness: TestHarness) {
    let result = harness.boards.create("   ").await;
    assert!(matches!(
        result,
        Err(TaskboardError::Domain(TaskboardDomainError::EmptyBoardName))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn get_missing_board_is_not_found(harness: TestHarness) {
    let id = crate::taskboard::domain::BoardId::new();
    let result = harness.boards.get(id).await;
    assert!(matches!(
        result,
        Err(TaskboardError::NotFound {
            resource: ResourceKind::Board,
            ..
        })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rename_updates_the_board(harness: TestHarness) -> eyre::Result<()> {
    let board = harness.boards.create("Sprint 1").await?;
    let renamed = harness.boards.rename(board.id(), "Sprint 2").await?;
    ensure!(renamed.name() == "Sprint 2");

    let fetched = harness.boards.get(board.id()).await?;
    ensure!(fetched.name() == "Sprint 2");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_returns_boards_sorted_by_name(harness: TestHarness) -> eyre::Result<()> {
    harness.boards.create("Zeta").await?;
    harness.boards.create("Alpha").await?;
    let names: Vec<String> = harness
        .boards
        .list()
        .await?
        .iter()
        .map(|board| board.name().to_owned())
        .collect();
    ensure!(names == vec!["Alpha".to_owned(), "Zeta".to_owned()]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_cascades_to_columns_cards_and_blocks(harness: TestHarness) -> eyre::Result<()> {
    let board = harness.boards.create("Sprint 1").await?;
    let card = harness.cards.create(board.id(), "Fix bug", None).await?;
    harness.blocks.block(card.id(), "waiting on design").await?;

    harness.boards.delete(board.id()).await?;

    ensure!(harness.repository.find_board(board.id()).await?.is_none());
    ensure!(harness.columns.list(board.id()).await?.is_empty());
    ensure!(harness.repository.find_card(card.id()).await?.is_none());
    ensure!(
        harness
            .repository
            .list_blocks_by_card(card.id())
            .await?
            .is_empty()
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_missing_board_is_not_found(harness: TestHarness) {
    let id = crate::taskboard::domain::BoardId::new();
    let result = harness.boards.delete(id).await;
    assert!(matches!(
        result,
        Err(TaskboardError::NotFound {
            resource: ResourceKind::Board,
            ..
        })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn special_column_lookups_resolve_on_a_provisioned_board(
    harness: TestHarness,
) -> eyre::Result<()> {
    let board = harness.boards.create("Sprint 1").await?;

    let initial = harness.boards.initial_column(board.id()).await?;
    ensure!(initial.kind() == ColumnKind::Initial);
    ensure!(initial.name() == "Backlog");

    let cancel = harness.boards.cancel_column(board.id()).await?;
    ensure!(cancel.kind() == ColumnKind::Cancel);
    ensure!(cancel.name() == "Canceled");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_special_column_is_an_integrity_error(harness: TestHarness) -> eyre::Result<()> {
    // A board written through the raw port, bypassing default provisioning,
    // models the corrupt low-level state the lookup must treat as fatal.
    let bare = Board::new("Bare")?;
    harness.repository.insert_board(&bare).await?;

    let result = harness.boards.initial_column(bare.id()).await;
    assert!(matches!(
        result,
        Err(TaskboardError::MissingSpecialColumn {
            kind: ColumnKind::Initial,
            ..
        })
    ));
    Ok(())
}
