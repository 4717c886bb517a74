//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its persisted field names.
//! - Provide text normalization and validation helpers.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `text` is non-empty after trimming.
//! - `completed` is the only state flag; `TaskState` is derived from it.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque task identifier.
///
/// Kept as a plain string so ids written by older clients (for example
/// millisecond timestamps) load unchanged.
pub type TaskId = String;

/// Validation failure for task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is empty or whitespace-only.
    EmptyText,
    /// Identifier is empty or whitespace-only.
    EmptyId,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text cannot be empty"),
            Self::EmptyId => write!(f, "task id cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Two-state lifecycle derived from `Task::completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Done,
}

/// Single to-do entry.
///
/// Field names match the persisted slot format:
/// `{"id": string, "text": string, "completed": bool}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
}

impl Task {
    /// Creates a pending task with the given id.
    ///
    /// Text is trimmed before it is stored.
    ///
    /// # Errors
    /// - `EmptyText` when `text` is empty after trimming.
    /// - `EmptyId` when `id` is blank.
    pub fn with_id(id: impl Into<TaskId>, text: &str) -> Result<Self, TaskValidationError> {
        let task = Self {
            id: id.into(),
            text: normalize_text(text)?,
            completed: false,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        Ok(())
    }

    pub fn state(&self) -> TaskState {
        if self.completed {
            TaskState::Done
        } else {
            TaskState::Pending
        }
    }

    /// Flips between `Pending` and `Done`.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Trims task text and rejects empty results.
pub fn normalize_text(text: &str) -> Result<String, TaskValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}

/// Generates a new random task id.
///
/// Uniqueness inside a collection is checked by the store.
pub fn generate_task_id() -> TaskId {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::{generate_task_id, normalize_text, Task, TaskState, TaskValidationError};

    #[test]
    fn new_task_is_pending_with_trimmed_text() {
        let task = Task::with_id(generate_task_id(), "  hello  ").unwrap();
        assert_eq!(task.text, "hello");
        assert!(!task.completed);
        assert_eq!(task.state(), TaskState::Pending);
        assert!(!task.id.is_empty());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(
            Task::with_id("1", "").unwrap_err(),
            TaskValidationError::EmptyText
        );
        assert_eq!(
            normalize_text(" \t\n ").unwrap_err(),
            TaskValidationError::EmptyText
        );
    }

    #[test]
    fn blank_id_is_rejected() {
        let err = Task::with_id("  ", "text").unwrap_err();
        assert_eq!(err, TaskValidationError::EmptyId);
    }

    #[test]
    fn toggle_is_an_involution() {
        let mut task = Task::with_id("1", "flip").unwrap();
        task.toggle();
        assert_eq!(task.state(), TaskState::Done);
        task.toggle();
        assert_eq!(task.state(), TaskState::Pending);
    }

    #[test]
    fn serializes_with_slot_field_names() {
        let task = Task::with_id("1712345678901", "Buy milk").unwrap();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "1712345678901", "text": "Buy milk", "completed": false})
        );
    }
}
