//! Core task list logic.
//! This crate owns the task collection, its invariants and its local
//! persistence.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{Task, TaskId, TaskState, TaskValidationError};
pub use repo::slot_repo::{RepoError, RepoResult, SlotStore, SqliteSlotStore};
pub use service::task_store::{
    LoadStatus, StoreError, StoreResult, TaskStore, TaskSummary, DEFAULT_SLOT_KEY,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
