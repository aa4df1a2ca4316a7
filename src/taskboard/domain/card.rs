//! Card entity and its movement-relevant state.

use super::{CardId, ColumnId, TaskboardDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A card travelling through the columns of a board.
///
/// The card references its current column by identifier; reassigning that
/// reference is how movement is modelled. Whether a card is blocked is
/// derived from its block history through the persistence ports, never
/// stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    column_id: ColumnId,
    title: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCardData {
    /// Persisted card identifier.
    pub id: CardId,
    /// Persisted current-column identifier.
    pub column_id: ColumnId,
    /// Persisted title.
    pub title: String,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last-mutation timestamp, if the card was ever mutated.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Creates a new card in the given column.
    ///
    /// `created_at` is stamped once from the clock; `updated_at` stays unset
    /// until the first mutation after creation.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardDomainError::EmptyCardTitle`] when the title is
    /// blank.
    pub fn new(
        column_id: ColumnId,
        title: impl Into<String>,
        description: Option<String>,
        clock: &impl Clock,
    ) -> Result<Self, TaskboardDomainError> {
        let validated = validated_title(title.into())?;
        Ok(Self {
            id: CardId::new(),
            column_id,
            title: validated,
            description,
            created_at: clock.utc(),
            updated_at: None,
        })
    }

    /// Reconstructs a card from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCardData) -> Self {
        Self {
            id: data.id,
            column_id: data.column_id,
            title: data.title,
            description: data.description,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the card identifier.
    #[must_use]
    pub const fn id(&self) -> CardId {
        self.id
    }

    /// Returns the current column's identifier.
    #[must_use]
    pub const fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last-mutation timestamp, if any mutation happened.
    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Overwrites title and description.
    ///
    /// Both fields are always replaced; there is no partial-update
    /// semantics at this layer.
    ///
    /// # Errors
    ///
    /// Returns [`TaskboardDomainError::EmptyCardTitle`] when the title is
    /// blank.
    pub fn update_details(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskboardDomainError> {
        self.title = validated_title(title.into())?;
        self.description = description;
        self.touch(clock);
        Ok(())
    }

    /// Reassigns the card to another column.
    ///
    /// The blocked-card guard lives in the card service, which sees the
    /// block history; this method performs the bare reassignment.
    pub fn move_to(&mut self, column_id: ColumnId, clock: &impl Clock) {
        self.column_id = column_id;
        self.touch(clock);
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = Some(clock.utc());
    }
}

fn validated_title(raw: String) -> Result<String, TaskboardDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskboardDomainError::EmptyCardTitle);
    }
    Ok(trimmed.to_owned())
}
