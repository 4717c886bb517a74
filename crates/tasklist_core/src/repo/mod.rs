//! Repository layer for local key-value slot persistence.
//!
//! # Responsibility
//! - Define the slot read/write contract used by the task store.
//! - Isolate SQLite query details from store orchestration.
//!
//! # Invariants
//! - A slot write replaces the whole value in a single statement.
//! - Repositories refuse connections that were not migrated.

pub mod slot_repo;
