//! Error types for taskboard domain validation and parsing.

use super::BlockId;
use thiserror::Error;

/// Errors returned while constructing or mutating domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskboardDomainError {
    /// The board name is empty after trimming.
    #[error("board name must not be empty")]
    EmptyBoardName,

    /// The column name is empty after trimming.
    #[error("column name must not be empty")]
    EmptyColumnName,

    /// The card title is empty after trimming.
    #[error("card title must not be empty")]
    EmptyCardTitle,

    /// A block or unblock reason is empty after trimming.
    #[error("block reason must not be empty")]
    EmptyBlockReason,

    /// The column order is zero or negative.
    #[error("invalid column order {0}, expected a positive integer")]
    NonPositiveColumnOrder(i32),

    /// The block has already been closed.
    #[error("block {0} is already closed")]
    BlockAlreadyClosed(BlockId),
}

/// Error returned while parsing column kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown column kind: {0}")]
pub struct ParseColumnKindError(pub String);
