//! Port contracts for the taskboard engine.
//!
//! Ports define infrastructure-agnostic interfaces used by taskboard
//! services.

pub mod repository;

pub use repository::{
    BlockRepository, BoardRepository, CardRepository, ColumnRepository, RepositoryError,
    RepositoryResult,
};
