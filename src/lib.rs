//! FlowDeck: kanban workflow domain engine.
//!
//! This crate provides the core functionality for a kanban-style task
//! system: boards that own ordered columns, cards that travel between
//! columns, and an auditable block history that can temporarily halt a
//! card's progress.
//!
//! # Architecture
//!
//! FlowDeck follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`taskboard`]: boards, columns, cards, and the block lifecycle

pub mod taskboard;
