//! Board aggregate root.

use super::{BoardId, TaskboardDomainError};
use serde::{Deserialize, Serialize};

/// A kanban board.
///
/// Columns reference their board by identifier; the board itself stays free
/// of embedded collections so the object graph carries no cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    id: BoardId,
    name: String,
}

/// Parameter object for reconstructing a persisted board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedBoardData {
    /// Persisted board identifier.
    pub id: BoardId,
    /// Persisted display name.
    pub name: String,
}

impl Board {
    /// Creates a new board.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardDomainError::EmptyBoardName`] when the name is
    /// blank.
    pub fn new(name: impl Into<String>) -> Result<Self, TaskboardDomainError> {
        let validated = validated_name(name.into())?;
        Ok(Self {
            id: BoardId::new(),
            name: validated,
        })
    }

    /// Reconstructs a board from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedBoardData) -> Self {
        Self {
            id: data.id,
            name: data.name,
        }
    }

    /// Returns the board identifier.
    #[must_use]
    pub const fn id(&self) -> BoardId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the board.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardDomainError::EmptyBoardName`] when the name is
    /// blank.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), TaskboardDomainError> {
        self.name = validated_name(name.into())?;
        Ok(())
    }
}

fn validated_name(raw: String) -> Result<String, TaskboardDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskboardDomainError::EmptyBoardName);
    }
    Ok(trimmed.to_owned())
}
