//! Tests for the read-only reporting derivations.

use super::support::{FixedClock, TestHarness, utc};
use crate::taskboard::{
    adapters::memory::InMemoryTaskboardRepository,
    domain::{Block, BlockId, BoardId, CardId, PersistedBlockData},
    ports::BlockRepository,
    services::ReportService,
};
use chrono::{DateTime, TimeDelta, Utc};
use eyre::{bail, ensure};
use rstest::{fixture, rstest};
use std::sync::Arc;

/// Reporting fixture: one populated board, one empty board, and a report
/// service whose clock is pinned to `now`.
struct ReportFixture {
    board_id: BoardId,
    now: DateTime<Utc>,
    reports: ReportService<InMemoryTaskboardRepository, FixedClock>,
}

fn closed_block(
    card_id: CardId,
    blocked_at: DateTime<Utc>,
    hours: i64,
    reason: &str,
) -> Block {
    Block::from_persisted(PersistedBlockData {
        id: BlockId::new(),
        card_id,
        blocked_at,
        block_reason: reason.to_owned(),
        unblocked_at: Some(blocked_at + TimeDelta::hours(hours)),
        unblock_reason: Some("resolved".to_owned()),
    })
}

fn open_block(card_id: CardId, blocked_at: DateTime<Utc>, reason: &str) -> Block {
    Block::from_persisted(PersistedBlockData {
        id: BlockId::new(),
        card_id,
        blocked_at,
        block_reason: reason.to_owned(),
        unblocked_at: None,
        unblock_reason: None,
    })
}

/// One board with three cards: a card with a closed 4h block and a still
/// open block, a card with a closed 2h block, and an untouched card. A
/// second board stays completely empty.
#[fixture]
async fn fixture() -> eyre::Result<ReportFixture> {
    let harness = TestHarness::new();
    let now = utc("2026-01-03T00:00:00Z");

    let board = harness.boards.create("Sprint 1").await?;
    harness.boards.create("Empty").await?;
    let card_a = harness.cards.create(board.id(), "Fix bug", None).await?;
    let card_b = harness.cards.create(board.id(), "Add docs", None).await?;
    harness.cards.create(board.id(), "Refactor", None).await?;

    harness
        .repository
        .insert_block(&closed_block(
            card_a.id(),
            utc("2026-01-01T00:00:00Z"),
            4,
            "waiting on design",
        ))
        .await?;
    harness
        .repository
        .insert_block(&closed_block(
            card_b.id(),
            utc("2026-01-01T01:00:00Z"),
            2,
            "ci outage",
        ))
        .await?;
    harness
        .repository
        .insert_block(&open_block(
            card_a.id(),
            utc("2026-01-02T00:00:00Z"),
            "waiting on design",
        ))
        .await?;

    let reports = ReportService::new(Arc::clone(&harness.repository), Arc::new(FixedClock(now)));
    Ok(ReportFixture {
        board_id: board.id(),
        now,
        reports,
    })
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blocks_in_range_filters_by_start_and_openness(
    #[future] fixture: eyre::Result<ReportFixture>,
) -> eyre::Result<()> {
    let fixture = fixture.await?;

    let first_day = fixture
        .reports
        .blocks_in_range(
            utc("2026-01-01T00:00:00Z"),
            utc("2026-01-01T23:59:59Z"),
            false,
        )
        .await?;
    ensure!(first_day.len() == 2);

    let first_day_open = fixture
        .reports
        .blocks_in_range(
            utc("2026-01-01T00:00:00Z"),
            utc("2026-01-01T23:59:59Z"),
            true,
        )
        .await?;
    ensure!(first_day_open.is_empty());

    let whole_period_open = fixture
        .reports
        .blocks_in_range(utc("2026-01-01T00:00:00Z"), fixture.now, true)
        .await?;
    ensure!(whole_period_open.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn most_common_reasons_rank_by_frequency_and_respect_the_limit(
    #[future] fixture: eyre::Result<ReportFixture>,
) -> eyre::Result<()> {
    let fixture = fixture.await?;

    let ranked = fixture.reports.most_common_block_reasons(5).await?;
    ensure!(
        ranked
            == vec![
                ("waiting on design".to_owned(), 2),
                ("ci outage".to_owned(), 1),
            ]
    );

    let top_one = fixture.reports.most_common_block_reasons(1).await?;
    ensure!(top_one == vec![("waiting on design".to_owned(), 2)]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn average_block_duration_counts_closed_blocks_only(
    #[future] fixture: eyre::Result<ReportFixture>,
) -> eyre::Result<()> {
    let fixture = fixture.await?;

    let average = fixture
        .reports
        .average_block_duration(fixture.board_id)
        .await?;
    ensure!(average == Some(TimeDelta::hours(3)));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn boards_without_closed_blocks_are_absent_from_the_averages(
    #[future] fixture: eyre::Result<ReportFixture>,
) -> eyre::Result<()> {
    let fixture = fixture.await?;

    let averages = fixture.reports.average_block_duration_by_board().await?;
    ensure!(averages == vec![(fixture.board_id, TimeDelta::hours(3))]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn long_duration_blocks_include_open_blocks_and_sort_longest_first(
    #[future] fixture: eyre::Result<ReportFixture>,
) -> eyre::Result<()> {
    let fixture = fixture.await?;

    let long = fixture
        .reports
        .long_duration_blocks(TimeDelta::hours(3))
        .await?;
    ensure!(long.len() == 2);

    let Some(longest) = long.first() else {
        bail!("expected at least one long block");
    };
    // The still-open block has run for a full day by `now`.
    ensure!(longest.is_open());
    ensure!(longest.duration_until(fixture.now) == TimeDelta::hours(24));

    let Some(runner_up) = long.last() else {
        bail!("expected a second long block");
    };
    ensure!(!runner_up.is_open());
    ensure!(runner_up.duration_until(fixture.now) == TimeDelta::hours(4));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn card_distribution_follows_display_order(
    #[future] fixture: eyre::Result<ReportFixture>,
) -> eyre::Result<()> {
    let fixture = fixture.await?;

    let distribution = fixture.reports.card_distribution(fixture.board_id).await?;
    ensure!(
        distribution
            == vec![
                ("Backlog".to_owned(), 3),
                ("To Do".to_owned(), 0),
                ("In Progress".to_owned(), 0),
                ("Done".to_owned(), 0),
                ("Canceled".to_owned(), 0),
            ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn columns_with_blocked_cards_report_only_affected_columns(
    #[future] fixture: eyre::Result<ReportFixture>,
) -> eyre::Result<()> {
    let fixture = fixture.await?;

    let names = fixture
        .reports
        .columns_with_blocked_cards(fixture.board_id)
        .await?;
    ensure!(names == vec!["Backlog".to_owned()]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activity_report_summarizes_the_period(
    #[future] fixture: eyre::Result<ReportFixture>,
) -> eyre::Result<()> {
    let fixture = fixture.await?;

    let report = fixture
        .reports
        .activity_report(utc("2026-01-01T00:00:00Z"), fixture.now, 1)
        .await?;
    ensure!(report.total_blocks == 3);
    ensure!(report.open_blocks == 1);
    ensure!(report.common_reasons == vec![("waiting on design".to_owned(), 2)]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn board_efficiency_compiles_the_snapshot(
    #[future] fixture: eyre::Result<ReportFixture>,
) -> eyre::Result<()> {
    let fixture = fixture.await?;

    let report = fixture.reports.board_efficiency(fixture.board_id).await?;
    ensure!(report.board_id == fixture.board_id);
    ensure!(report.total_cards == 3);
    ensure!(report.average_block_duration == Some(TimeDelta::hours(3)));
    ensure!(report.columns_with_blocked_cards == vec!["Backlog".to_owned()]);
    Ok(())
}
