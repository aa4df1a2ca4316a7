//! Column entity and the closed set of column kinds.

use super::{BoardId, ColumnId, ParseColumnKindError, TaskboardDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a board column.
///
/// [`Initial`](Self::Initial), [`Final`](Self::Final), and
/// [`Cancel`](Self::Cancel) are the special kinds: a board holds at most one
/// column of each, and they are protected from deletion. Any number of
/// [`Pending`](Self::Pending) columns may exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Entry column where new cards are created.
    Initial,
    /// Regular column for cards in progress.
    Pending,
    /// Terminal column for completed cards.
    Final,
    /// Terminal column for canceled cards.
    Cancel,
}

impl ColumnKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Pending => "pending",
            Self::Final => "final",
            Self::Cancel => "cancel",
        }
    }

    /// Returns `true` for the kinds limited to one column per board.
    #[must_use]
    pub const fn is_special(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl TryFrom<&str> for ColumnKind {
    type Error = ParseColumnKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "initial" => Ok(Self::Initial),
            "pending" => Ok(Self::Pending),
            "final" => Ok(Self::Final),
            "cancel" => Ok(Self::Cancel),
            _ => Err(ParseColumnKindError(value.to_owned())),
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, ordered column belonging to a board.
///
/// The `order` value drives display sequencing. Sparse and duplicate orders
/// are tolerated in storage; contiguity is a derived convenience restored by
/// the column service's normalize operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    id: ColumnId,
    board_id: BoardId,
    name: String,
    order: i32,
    kind: ColumnKind,
}

/// Parameter object for reconstructing a persisted column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedColumnData {
    /// Persisted column identifier.
    pub id: ColumnId,
    /// Persisted owning-board identifier.
    pub board_id: BoardId,
    /// Persisted display name.
    pub name: String,
    /// Persisted display order.
    pub order: i32,
    /// Persisted column kind.
    pub kind: ColumnKind,
}

impl Column {
    /// Creates a new column on the given board.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardDomainError::EmptyColumnName`] when the name is
    /// blank and [`TaskboardDomainError::NonPositiveColumnOrder`] when the
    /// order is not positive.
    pub fn new(
        board_id: BoardId,
        name: impl Into<String>,
        kind: ColumnKind,
        order: i32,
    ) -> Result<Self, TaskboardDomainError> {
        let validated = validated_name(name.into())?;
        if order <= 0 {
            return Err(TaskboardDomainError::NonPositiveColumnOrder(order));
        }
        Ok(Self {
            id: ColumnId::new(),
            board_id,
            name: validated,
            order,
            kind,
        })
    }

    /// Reconstructs a column from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedColumnData) -> Self {
        Self {
            id: data.id,
            board_id: data.board_id,
            name: data.name,
            order: data.order,
            kind: data.kind,
        }
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the owning board's identifier.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display order.
    #[must_use]
    pub const fn order(&self) -> i32 {
        self.order
    }

    /// Returns the column kind.
    #[must_use]
    pub const fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Renames the column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardDomainError::EmptyColumnName`] when the name is
    /// blank.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), TaskboardDomainError> {
        self.name = validated_name(name.into())?;
        Ok(())
    }

    /// Changes the column kind.
    ///
    /// Special-kind uniqueness across a board is enforced by the column
    /// service and the storage constraint, not here.
    pub const fn change_kind(&mut self, kind: ColumnKind) {
        self.kind = kind;
    }

    /// Assigns a new display order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardDomainError::NonPositiveColumnOrder`] when the
    /// order is not positive.
    pub const fn set_order(&mut self, order: i32) -> Result<(), TaskboardDomainError> {
        if order <= 0 {
            return Err(TaskboardDomainError::NonPositiveColumnOrder(order));
        }
        self.order = order;
        Ok(())
    }
}

fn validated_name(raw: String) -> Result<String, TaskboardDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskboardDomainError::EmptyColumnName);
    }
    Ok(trimmed.to_owned())
}
