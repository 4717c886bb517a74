//! Task list domain model.
//!
//! # Responsibility
//! - Define the task record shared by the store, storage and presentation.
//! - Own text normalization and validation rules.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Task text is never empty after trimming.

pub mod task;
