//! Diesel row models for taskboard persistence.

use super::schema::{blocks, board_columns, boards, cards};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for board records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = boards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BoardRow {
    /// Board identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
}

/// Insert/update model for board records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = boards)]
pub struct NewBoardRow {
    /// Board identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
}

/// Query result row for column records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = board_columns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ColumnRow {
    /// Column identifier.
    pub id: uuid::Uuid,
    /// Owning board.
    pub board_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Display order.
    pub column_order: i32,
    /// Column kind in canonical string form.
    pub kind: String,
}

/// Insert/update model for column records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = board_columns)]
pub struct NewColumnRow {
    /// Column identifier.
    pub id: uuid::Uuid,
    /// Owning board.
    pub board_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Display order.
    pub column_order: i32,
    /// Column kind in canonical string form.
    pub kind: String,
}

/// Query result row for card records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CardRow {
    /// Card identifier.
    pub id: uuid::Uuid,
    /// Current column.
    pub board_column_id: uuid::Uuid,
    /// Card title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-mutation timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert/update model for card records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = cards, treat_none_as_null = true)]
pub struct NewCardRow {
    /// Card identifier.
    pub id: uuid::Uuid,
    /// Current column.
    pub board_column_id: uuid::Uuid,
    /// Card title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-mutation timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Query result row for block records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = blocks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BlockRow {
    /// Block identifier.
    pub id: uuid::Uuid,
    /// Owning card.
    pub card_id: uuid::Uuid,
    /// Block timestamp.
    pub blocked_at: DateTime<Utc>,
    /// Block reason.
    pub block_reason: String,
    /// Unblock timestamp.
    pub unblocked_at: Option<DateTime<Utc>>,
    /// Unblock reason.
    pub unblock_reason: Option<String>,
}

/// Insert/update model for block records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = blocks, treat_none_as_null = true)]
pub struct NewBlockRow {
    /// Block identifier.
    pub id: uuid::Uuid,
    /// Owning card.
    pub card_id: uuid::Uuid,
    /// Block timestamp.
    pub blocked_at: DateTime<Utc>,
    /// Block reason.
    pub block_reason: String,
    /// Unblock timestamp.
    pub unblocked_at: Option<DateTime<Utc>>,
    /// Unblock reason.
    pub unblock_reason: Option<String>,
}
