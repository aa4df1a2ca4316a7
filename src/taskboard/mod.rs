//! Board, column, card, and block lifecycle management.
//!
//! This module implements the workflow engine behind a kanban board:
//! column-kind policy (special-column uniqueness and deletion protection),
//! column ordering and normalization, the card block/unblock state machine,
//! and card movement and cancellation rules. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
