//! Block entity: one entry in a card's block history.

use super::{BlockId, CardId, TaskboardDomainError};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A single block/unblock cycle in a card's history.
///
/// A block is *open* while `unblocked_at` is unset; an open block makes its
/// card blocked. History is append-only: closing a block keeps it around
/// with the unblock timestamp and reason filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    id: BlockId,
    card_id: CardId,
    blocked_at: DateTime<Utc>,
    block_reason: String,
    unblocked_at: Option<DateTime<Utc>>,
    unblock_reason: Option<String>,
}

/// Parameter object for reconstructing a persisted block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedBlockData {
    /// Persisted block identifier.
    pub id: BlockId,
    /// Persisted owning-card identifier.
    pub card_id: CardId,
    /// Persisted block timestamp.
    pub blocked_at: DateTime<Utc>,
    /// Persisted block reason.
    pub block_reason: String,
    /// Persisted unblock timestamp, when the block is closed.
    pub unblocked_at: Option<DateTime<Utc>>,
    /// Persisted unblock reason, set together with `unblocked_at`.
    pub unblock_reason: Option<String>,
}

impl Block {
    /// Opens a new block on the given card.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardDomainError::EmptyBlockReason`] when the reason is
    /// blank.
    pub fn new(
        card_id: CardId,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, TaskboardDomainError> {
        let validated = validated_reason(reason.into())?;
        Ok(Self {
            id: BlockId::new(),
            card_id,
            blocked_at: clock.utc(),
            block_reason: validated,
            unblocked_at: None,
            unblock_reason: None,
        })
    }

    /// Reconstructs a block from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedBlockData) -> Self {
        Self {
            id: data.id,
            card_id: data.card_id,
            blocked_at: data.blocked_at,
            block_reason: data.block_reason,
            unblocked_at: data.unblocked_at,
            unblock_reason: data.unblock_reason,
        }
    }

    /// Returns the block identifier.
    #[must_use]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    /// Returns the owning card's identifier.
    #[must_use]
    pub const fn card_id(&self) -> CardId {
        self.card_id
    }

    /// Returns the block timestamp.
    #[must_use]
    pub const fn blocked_at(&self) -> DateTime<Utc> {
        self.blocked_at
    }

    /// Returns the block reason.
    #[must_use]
    pub fn block_reason(&self) -> &str {
        &self.block_reason
    }

    /// Returns the unblock timestamp, when closed.
    #[must_use]
    pub const fn unblocked_at(&self) -> Option<DateTime<Utc>> {
        self.unblocked_at
    }

    /// Returns the unblock reason, when closed.
    #[must_use]
    pub fn unblock_reason(&self) -> Option<&str> {
        self.unblock_reason.as_deref()
    }

    /// Returns `true` while the block has not been closed.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.unblocked_at.is_none()
    }

    /// Closes the block.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardDomainError::BlockAlreadyClosed`] when the block
    /// was closed before and [`TaskboardDomainError::EmptyBlockReason`] when
    /// the reason is blank.
    pub fn close(
        &mut self,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskboardDomainError> {
        if !self.is_open() {
            return Err(TaskboardDomainError::BlockAlreadyClosed(self.id));
        }
        let validated = validated_reason(reason.into())?;
        self.unblocked_at = Some(clock.utc());
        self.unblock_reason = Some(validated);
        Ok(())
    }

    /// Returns how long the block has been (or was) in effect.
    ///
    /// Closed blocks measure from `blocked_at` to `unblocked_at`; open
    /// blocks measure against the supplied instant.
    #[must_use]
    pub fn duration_until(&self, now: DateTime<Utc>) -> TimeDelta {
        self.unblocked_at.unwrap_or(now) - self.blocked_at
    }
}

fn validated_reason(raw: String) -> Result<String, TaskboardDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskboardDomainError::EmptyBlockReason);
    }
    Ok(trimmed.to_owned())
}
