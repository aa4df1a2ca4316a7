//! Shared fixtures for taskboard tests.

use crate::taskboard::adapters::memory::InMemoryTaskboardRepository;
use crate::taskboard::services::{BlockService, BoardService, CardService, ColumnService};
use chrono::{DateTime, Local, Utc};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;

/// Clock pinned to a fixed instant for deterministic assertions.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Parses an RFC 3339 timestamp into UTC.
pub fn utc(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp)
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc)
}

/// Bundle of services sharing one in-memory repository.
pub struct TestHarness {
    pub repository: Arc<InMemoryTaskboardRepository>,
    pub boards: BoardService<InMemoryTaskboardRepository>,
    pub columns: ColumnService<InMemoryTaskboardRepository>,
    pub cards: CardService<InMemoryTaskboardRepository, DefaultClock>,
    pub blocks: BlockService<InMemoryTaskboardRepository, DefaultClock>,
}

impl TestHarness {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryTaskboardRepository::new());
        let clock = Arc::new(DefaultClock);
        Self {
            boards: BoardService::new(Arc::clone(&repository)),
            columns: ColumnService::new(Arc::clone(&repository)),
            cards: CardService::new(Arc::clone(&repository), Arc::clone(&clock)),
            blocks: BlockService::new(Arc::clone(&repository), Arc::clone(&clock)),
            repository,
        }
    }
}
