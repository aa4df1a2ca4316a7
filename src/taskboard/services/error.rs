//! Service-level error taxonomy for taskboard operations.
//!
//! Every error is raised at the point of detection and propagates unchanged
//! to the caller; the services never retry or recover locally. Storage
//! conflicts from the repository's uniqueness constraints are folded into
//! the matching conflict variants, so the loser of a concurrent race sees
//! the same typed error as a sequential caller.

use crate::taskboard::domain::{
    BoardId, CardId, ColumnId, ColumnKind, TaskboardDomainError,
};
use crate::taskboard::ports::RepositoryError;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Kind of resource referenced by a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A board.
    Board,
    /// A board column.
    Column,
    /// A card.
    Card,
    /// A block.
    Block,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Board => "board",
            Self::Column => "column",
            Self::Card => "card",
            Self::Block => "block",
        };
        f.write_str(label)
    }
}

/// Result type for taskboard service operations.
pub type TaskboardResult<T> = Result<T, TaskboardError>;

/// Errors surfaced by the taskboard services.
#[derive(Debug, Error)]
pub enum TaskboardError {
    /// A referenced resource does not exist.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of the missing resource.
        resource: ResourceKind,
        /// Identifier that failed to resolve.
        id: Uuid,
    },

    /// `block` was called on a card that already has an open block.
    #[error("card {0} is already blocked")]
    CardAlreadyBlocked(CardId),

    /// `unblock` was called on a card with no open block.
    #[error("card {0} is not blocked")]
    CardNotBlocked(CardId),

    /// A movement operation was attempted on a blocked card.
    #[error("card {0} is blocked, operation refused")]
    BlockedCard(CardId),

    /// Creating or retyping a column would duplicate a special kind.
    #[error("a {kind} column already exists on board {board_id}")]
    SpecialColumnConflict {
        /// Board carrying the conflicting column.
        board_id: BoardId,
        /// The special kind that collided.
        kind: ColumnKind,
    },

    /// A special column was targeted for deletion.
    #[error("column {column_id} is a protected {kind} column")]
    SpecialColumnProtected {
        /// The protected column.
        column_id: ColumnId,
        /// Its special kind.
        kind: ColumnKind,
    },

    /// A column still holding cards was targeted for deletion.
    #[error("column {column_id} still holds {card_count} card(s)")]
    ColumnNotEmpty {
        /// The non-empty column.
        column_id: ColumnId,
        /// How many cards it holds.
        card_count: usize,
    },

    /// The reorder input is not a permutation of the board's column ids.
    #[error("reorder input is not a permutation of the columns of board {board_id}")]
    InvalidReorderSet {
        /// Board whose columns were being reordered.
        board_id: BoardId,
    },

    /// A required special column is missing from an initialized board.
    ///
    /// This is a fatal integrity failure, not a user-facing conflict: a
    /// board provisioned through the board service always carries its
    /// special columns.
    #[error("board {board_id} is missing its {kind} column")]
    MissingSpecialColumn {
        /// The corrupt board.
        board_id: BoardId,
        /// The absent special kind.
        kind: ColumnKind,
    },

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskboardDomainError),

    /// Repository operation failed.
    #[error("repository failure: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for TaskboardError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::BoardNotFound(id) => Self::NotFound {
                resource: ResourceKind::Board,
                id: id.into_inner(),
            },
            RepositoryError::ColumnNotFound(id) => Self::NotFound {
                resource: ResourceKind::Column,
                id: id.into_inner(),
            },
            RepositoryError::CardNotFound(id) => Self::NotFound {
                resource: ResourceKind::Card,
                id: id.into_inner(),
            },
            RepositoryError::BlockNotFound(id) => Self::NotFound {
                resource: ResourceKind::Block,
                id: id.into_inner(),
            },
            RepositoryError::DuplicateSpecialColumn { board_id, kind } => {
                Self::SpecialColumnConflict { board_id, kind }
            }
            RepositoryError::OpenBlockExists(card_id) => Self::CardAlreadyBlocked(card_id),
            err @ RepositoryError::Persistence(_) => Self::Repository(err),
        }
    }
}
