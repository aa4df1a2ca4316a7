//! Diesel schema for taskboard persistence.
//!
//! Two partial unique indexes back the engine's storage constraints:
//! `idx_board_columns_special_kind_unique` on `(board_id, kind)` where
//! `kind <> 'pending'`, and `idx_blocks_open_per_card_unique` on `card_id`
//! where `unblocked_at IS NULL`. Foreign keys carry no `ON DELETE CASCADE`;
//! the repository deletes child rows explicitly inside one transaction.

diesel::table! {
    /// Kanban boards.
    boards (id) {
        /// Board identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
    }
}

diesel::table! {
    /// Ordered columns of a board.
    board_columns (id) {
        /// Column identifier.
        id -> Uuid,
        /// Owning board.
        board_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Display order; sparse and duplicate values are tolerated.
        column_order -> Int4,
        /// Column kind (initial/pending/final/cancel).
        #[max_length = 20]
        kind -> Varchar,
    }
}

diesel::table! {
    /// Cards travelling through board columns.
    cards (id) {
        /// Card identifier.
        id -> Uuid,
        /// Current column.
        board_column_id -> Uuid,
        /// Card title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Creation timestamp, set once.
        created_at -> Timestamptz,
        /// Last-mutation timestamp, unset until the first mutation.
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only block history of cards.
    blocks (id) {
        /// Block identifier.
        id -> Uuid,
        /// Owning card.
        card_id -> Uuid,
        /// Block timestamp.
        blocked_at -> Timestamptz,
        /// Block reason.
        block_reason -> Text,
        /// Unblock timestamp; `NULL` while the block is open.
        unblocked_at -> Nullable<Timestamptz>,
        /// Unblock reason, set together with `unblocked_at`.
        unblock_reason -> Nullable<Text>,
    }
}

diesel::joinable!(board_columns -> boards (board_id));
diesel::joinable!(cards -> board_columns (board_column_id));
diesel::joinable!(blocks -> cards (card_id));

diesel::allow_tables_to_appear_in_same_query!(boards, board_columns, cards, blocks);
