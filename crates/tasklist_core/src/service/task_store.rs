//! Task list store.
//!
//! # Responsibility
//! - Hold the ordered task collection for one session.
//! - Apply add/toggle/rename/delete and persist the whole collection after
//!   every effective mutation.
//! - Load the collection at startup, recovering from undecodable content
//!   and refusing to continue when the slot cannot be read.
//!
//! # Invariants
//! - Task ids are unique within the collection.
//! - No task has empty text after trimming.
//! - Insertion order is iteration order; mutations never reorder tasks.
//! - Unknown ids are silent no-ops, not errors.
//! - A failed persist keeps the in-memory mutation; memory stays
//!   authoritative for the session.

use crate::model::task::{generate_task_id, normalize_text, Task, TaskId, TaskValidationError};
use crate::repo::slot_repo::{RepoError, SlotStore};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot key used when none is given.
pub const DEFAULT_SLOT_KEY: &str = "todos";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Text was empty after trimming; nothing changed.
    InvalidInput(TaskValidationError),
    /// The slot could not be read at load; its contents were not touched.
    PersistenceReadFailed(RepoError),
    /// The collection could not be encoded for storage.
    Encode(serde_json::Error),
    /// The slot write failed; the in-memory mutation was kept.
    PersistenceWriteFailed(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::PersistenceReadFailed(err) => write!(f, "failed to read task list: {err}"),
            Self::Encode(err) => write!(f, "failed to encode task list: {err}"),
            Self::PersistenceWriteFailed(err) => write!(f, "failed to persist task list: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::PersistenceReadFailed(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::PersistenceWriteFailed(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

/// How the collection was obtained at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// The slot did not exist; started empty.
    Missing,
    /// The slot was decoded successfully.
    Loaded { count: usize },
    /// The slot content could not be decoded; started empty.
    Recovered { reason: String },
}

/// Counts over the current collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub total: usize,
    pub pending: usize,
    pub done: usize,
}

/// Owner of the session task collection.
pub struct TaskStore<S: SlotStore> {
    slots: S,
    slot_key: String,
    tasks: Vec<Task>,
    load_status: LoadStatus,
}

impl<S: SlotStore> TaskStore<S> {
    /// Loads the collection from the default slot.
    pub fn load(slots: S) -> StoreResult<Self> {
        Self::load_with_key(slots, DEFAULT_SLOT_KEY)
    }

    /// Loads the collection from `slot_key`.
    ///
    /// An absent slot yields an empty collection. Content that cannot be
    /// decoded is replaced by an empty collection with
    /// `LoadStatus::Recovered`.
    ///
    /// # Errors
    /// - `PersistenceReadFailed` when the slot itself cannot be read. No store
    ///   is returned, so nothing can be written over the stored tasks.
    pub fn load_with_key(slots: S, slot_key: impl Into<String>) -> StoreResult<Self> {
        let slot_key = slot_key.into();
        let raw = match slots.read_slot(&slot_key) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    "event=store_load module=store status=error slot={} error_code=persistence_read_failed error={}",
                    slot_key, err
                );
                return Err(StoreError::PersistenceReadFailed(err));
            }
        };

        let (tasks, load_status) = match raw {
            None => (Vec::new(), LoadStatus::Missing),
            Some(raw) => match decode_collection(&raw) {
                Ok(tasks) => {
                    let count = tasks.len();
                    (tasks, LoadStatus::Loaded { count })
                }
                Err(reason) => (Vec::new(), LoadStatus::Recovered { reason }),
            },
        };

        match &load_status {
            LoadStatus::Missing => info!(
                "event=store_load module=store status=ok slot={} source=missing count=0",
                slot_key
            ),
            LoadStatus::Loaded { count } => info!(
                "event=store_load module=store status=ok slot={} source=slot count={}",
                slot_key, count
            ),
            LoadStatus::Recovered { reason } => warn!(
                "event=store_load module=store status=recovered slot={} error_code=persistence_read_corrupt error={}",
                slot_key, reason
            ),
        }

        Ok(Self {
            slots,
            slot_key,
            tasks,
            load_status,
        })
    }

    /// Current tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    pub fn load_status(&self) -> &LoadStatus {
        &self.load_status
    }

    pub fn summary(&self) -> TaskSummary {
        let done = self.tasks.iter().filter(|task| task.completed).count();
        TaskSummary {
            total: self.tasks.len(),
            pending: self.tasks.len() - done,
            done,
        }
    }

    /// Appends a new pending task and persists.
    ///
    /// # Errors
    /// - `InvalidInput` when `text` is empty after trimming; nothing changes.
    /// - `PersistenceWriteFailed` when the slot write fails; the task stays
    ///   in memory.
    pub fn add(&mut self, text: &str) -> StoreResult<Task> {
        let task = match Task::with_id(self.next_id(), text) {
            Ok(task) => task,
            Err(err) => {
                debug!("event=task_add module=store status=rejected reason=empty_text");
                return Err(err.into());
            }
        };
        self.tasks.push(task.clone());
        info!(
            "event=task_add module=store status=ok task_id={} count={}",
            task.id,
            self.tasks.len()
        );

        self.persist()?;
        Ok(task)
    }

    /// Flips `completed` on the matching task and persists.
    ///
    /// Unknown ids are a no-op.
    pub fn toggle(&mut self, id: &str) -> StoreResult<()> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("event=task_toggle module=store status=noop task_id={id}");
            return Ok(());
        };

        task.toggle();
        info!(
            "event=task_toggle module=store status=ok task_id={} completed={}",
            id, task.completed
        );
        self.persist()
    }

    /// Replaces the text of the matching task and persists.
    ///
    /// Text is validated before the id is looked up.
    ///
    /// # Errors
    /// - `InvalidInput` when `text` is empty after trimming; nothing changes.
    pub fn rename(&mut self, id: &str, text: &str) -> StoreResult<()> {
        let text = match normalize_text(text) {
            Ok(text) => text,
            Err(err) => {
                debug!("event=task_rename module=store status=rejected task_id={id} reason=empty_text");
                return Err(err.into());
            }
        };

        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("event=task_rename module=store status=noop task_id={id}");
            return Ok(());
        };

        task.text = text;
        info!("event=task_rename module=store status=ok task_id={id}");
        self.persist()
    }

    /// Removes the matching task and persists.
    ///
    /// Unknown ids are a no-op, so repeated deletes are harmless.
    pub fn delete(&mut self, id: &str) -> StoreResult<()> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("event=task_delete module=store status=noop task_id={id}");
            return Ok(());
        };

        self.tasks.remove(index);
        info!(
            "event=task_delete module=store status=ok task_id={} count={}",
            id,
            self.tasks.len()
        );
        self.persist()
    }

    fn next_id(&self) -> TaskId {
        loop {
            let candidate = generate_task_id();
            if self.get(&candidate).is_none() {
                return candidate;
            }
            warn!("event=task_id_collision module=store status=retry task_id={candidate}");
        }
    }

    fn persist(&self) -> StoreResult<()> {
        let payload = serde_json::to_string(&self.tasks).map_err(StoreError::Encode)?;

        match self.slots.write_slot(&self.slot_key, &payload) {
            Ok(()) => {
                debug!(
                    "event=store_persist module=store status=ok slot={} count={} bytes={}",
                    self.slot_key,
                    self.tasks.len(),
                    payload.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_persist module=store status=error slot={} error_code=persistence_write_failed error={}",
                    self.slot_key, err
                );
                Err(StoreError::PersistenceWriteFailed(err))
            }
        }
    }
}

/// Decodes a slot payload and checks collection invariants.
///
/// Loaded text is trimmed the same way `add` and `rename` trim input.
/// Returns a human-readable reason on failure.
fn decode_collection(raw: &str) -> Result<Vec<Task>, String> {
    let mut tasks: Vec<Task> =
        serde_json::from_str(raw).map_err(|err| format!("malformed slot payload: {err}"))?;

    let mut seen = HashSet::with_capacity(tasks.len());
    for (index, task) in tasks.iter_mut().enumerate() {
        task.text = normalize_text(&task.text)
            .map_err(|err| format!("invalid task at index {index}: {err}"))?;
        task.validate()
            .map_err(|err| format!("invalid task at index {index}: {err}"))?;
        if !seen.insert(task.id.clone()) {
            return Err(format!("duplicate task id `{}` at index {index}", task.id));
        }
    }

    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::decode_collection;

    #[test]
    fn decode_accepts_empty_array() {
        assert!(decode_collection("[]").unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_non_array_payloads() {
        assert!(decode_collection("{\"id\":\"1\"}").is_err());
        assert!(decode_collection("not json").is_err());
        assert!(decode_collection("").is_err());
    }

    #[test]
    fn decode_rejects_duplicate_ids() {
        let raw = r#"[
            {"id": "1", "text": "a", "completed": false},
            {"id": "1", "text": "b", "completed": true}
        ]"#;
        let reason = decode_collection(raw).unwrap_err();
        assert!(reason.contains("duplicate"));
    }

    #[test]
    fn decode_rejects_blank_text() {
        let raw = r#"[{"id": "1", "text": "   ", "completed": false}]"#;
        assert!(decode_collection(raw).is_err());
    }

    #[test]
    fn decode_trims_stored_text() {
        let raw = r#"[{"id": "1", "text": "  padded  ", "completed": true}]"#;
        let tasks = decode_collection(raw).unwrap();
        assert_eq!(tasks[0].text, "padded");
        assert!(tasks[0].completed);
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let raw = r#"[{"id": "1", "text": "a"}]"#;
        assert!(decode_collection(raw).is_err());
    }
}
