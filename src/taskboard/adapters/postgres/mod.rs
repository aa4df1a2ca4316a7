//! `PostgreSQL` adapters for taskboard persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskboardRepository, TaskboardPgPool};
