//! The task store.
//!
//! Holds the active list (and, for the separate-list model, the completed list)
//! in memory and rewrites the affected lists to storage at the end of every
//! mutating call. Storage failures are logged and never returned.

use chrono::{Local, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::dates::format_date;
use crate::error::{PersistenceError, ValidationError, MIN_SUBJECT_LEN};
use crate::fields::{CompletionModel, DateFormat, Field};
use crate::storage::{KeyValueStore, COMPLETED_TASKS_KEY, TASKS_KEY};
use crate::task::{NewTask, Task, TaskPatch};

/// Behaviour switches shared by the store and the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreConfig {
    pub completion_model: CompletionModel,
    pub date_format: DateFormat,
}

/// Which list a record currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Active,
    Completed,
}

/// Outcome of [`TaskStore::complete_or_toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Flag model: the new value of the `completed` flag.
    Toggled(bool),
    /// Separate-list model: the record moved to the completed list.
    Moved,
}

/// Check the two required fields of a draft.
pub fn validate(subject: &str, title: &str) -> Result<(), ValidationError> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(ValidationError::EmptyField { field: Field::Subject });
    }
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: Field::Title });
    }
    let actual = subject.chars().count();
    if actual < MIN_SUBJECT_LEN {
        return Err(ValidationError::SubjectTooShort {
            min: MIN_SUBJECT_LEN,
            actual,
        });
    }
    Ok(())
}

/// Ordered task lists mirrored to a [`KeyValueStore`].
pub struct TaskStore<S> {
    config: StoreConfig,
    storage: S,
    active: Vec<Task>,
    completed: Vec<Task>,
    last_id: u64,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Create an empty store without touching storage.
    pub fn new(storage: S, config: StoreConfig) -> Self {
        Self {
            config,
            storage,
            active: Vec::new(),
            completed: Vec::new(),
            last_id: 0,
        }
    }

    /// Create a store and load its lists from storage.
    pub fn open(storage: S, config: StoreConfig) -> Self {
        let mut store = Self::new(storage, config);
        store.load();
        store
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn active(&self) -> &[Task] {
        &self.active
    }

    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    /// Look up a record in the active list.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.active.iter().find(|t| t.id == id)
    }

    /// Look up a record in either list.
    pub fn find_any(&self, id: &str) -> Option<(&Task, ListKind)> {
        self.get(id)
            .map(|t| (t, ListKind::Active))
            .or_else(|| {
                self.completed
                    .iter()
                    .find(|t| t.id == id)
                    .map(|t| (t, ListKind::Completed))
            })
    }

    /// Reload the lists from storage.
    ///
    /// A missing key yields an empty list. A read failure keeps the current
    /// in-memory list. Malformed JSON resets the list to empty and moves the
    /// bad payload aside.
    pub fn load(&mut self) {
        if let Some(list) = read_list(&mut self.storage, TASKS_KEY) {
            self.active = list;
        }
        if self.config.completion_model == CompletionModel::SeparateList {
            if let Some(list) = read_list(&mut self.storage, COMPLETED_TASKS_KEY) {
                self.completed = list;
            }
        }
        // The flag model leaves completedTasks alone, but its ids still count.
        let unowned = match self.config.completion_model {
            CompletionModel::Flag => stored_ids(&self.storage, COMPLETED_TASKS_KEY),
            CompletionModel::SeparateList => Vec::new(),
        };
        self.last_id = self
            .active
            .iter()
            .chain(self.completed.iter())
            .filter_map(|t| t.id.parse::<u64>().ok())
            .chain(unowned)
            .max()
            .unwrap_or(0);
        debug!(
            active = self.active.len(),
            completed = self.completed.len(),
            "loaded task lists"
        );
    }

    /// Write every list this store owns.
    pub fn save(&mut self) {
        write_list(&mut self.storage, TASKS_KEY, &self.active);
        if self.config.completion_model == CompletionModel::SeparateList {
            write_list(&mut self.storage, COMPLETED_TASKS_KEY, &self.completed);
        }
    }

    /// Validate and append a new record. Returns the new id.
    pub fn add(&mut self, new: NewTask) -> Result<String, ValidationError> {
        validate(&new.subject, &new.title)?;
        let id = self.next_id();
        self.active.push(Task {
            id: id.clone(),
            subject: new.subject.trim().to_string(),
            title: new.title.trim().to_string(),
            deadline: new.deadline,
            completed: false,
            completed_date: None,
        });
        info!(%id, "task added");
        write_list(&mut self.storage, TASKS_KEY, &self.active);
        Ok(id)
    }

    /// Merge `patch` into the active record with `id`.
    ///
    /// Returns `Ok(false)` when no such record exists. Present subject/title
    /// values are trimmed and must still pass validation.
    pub fn update(&mut self, id: &str, mut patch: TaskPatch) -> Result<bool, ValidationError> {
        let Some(idx) = self.active.iter().position(|t| t.id == id) else {
            debug!(%id, "update ignored, no such task");
            return Ok(false);
        };
        patch.subject = patch.subject.map(|s| s.trim().to_string());
        patch.title = patch.title.map(|s| s.trim().to_string());
        {
            let current = &self.active[idx];
            validate(
                patch.subject.as_deref().unwrap_or(current.subject.as_str()),
                patch.title.as_deref().unwrap_or(current.title.as_str()),
            )?;
        }
        self.active[idx].apply(patch);
        info!(%id, "task updated");
        write_list(&mut self.storage, TASKS_KEY, &self.active);
        Ok(true)
    }

    /// Remove a record from the active list.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.active.len();
        self.active.retain(|t| t.id != id);
        let removed = self.active.len() != before;
        if removed {
            info!(%id, "task removed");
        }
        write_list(&mut self.storage, TASKS_KEY, &self.active);
        removed
    }

    /// Remove a record from the completed list (separate-list model).
    pub fn remove_completed(&mut self, id: &str) -> bool {
        if self.config.completion_model != CompletionModel::SeparateList {
            debug!(%id, "remove_completed ignored under the flag model");
            return false;
        }
        let before = self.completed.len();
        self.completed.retain(|t| t.id != id);
        let removed = self.completed.len() != before;
        if removed {
            info!(%id, "completed task removed");
        }
        write_list(&mut self.storage, COMPLETED_TASKS_KEY, &self.completed);
        removed
    }

    /// Flip the `completed` flag (flag model). Returns the new value.
    pub fn toggle_completed(&mut self, id: &str) -> Option<bool> {
        if self.config.completion_model != CompletionModel::Flag {
            debug!(%id, "toggle ignored under the separate-list model");
            return None;
        }
        let task = self.active.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        let now = task.completed;
        info!(%id, completed = now, "task toggled");
        write_list(&mut self.storage, TASKS_KEY, &self.active);
        Some(now)
    }

    /// Move a record to the front of the completed list, stamped with today's date.
    pub fn complete(&mut self, id: &str) -> bool {
        self.complete_on(id, Local::now().date_naive())
    }

    /// Like [`complete`](Self::complete) with an explicit completion day.
    pub fn complete_on(&mut self, id: &str, day: NaiveDate) -> bool {
        if self.config.completion_model != CompletionModel::SeparateList {
            debug!(%id, "complete ignored under the flag model");
            return false;
        }
        let Some(idx) = self.active.iter().position(|t| t.id == id) else {
            return false;
        };
        let mut task = self.active.remove(idx);
        task.completed_date = Some(format_date(day, self.config.date_format));
        self.completed.insert(0, task);
        info!(%id, "task completed");
        self.save();
        true
    }

    /// Complete a record the way the configured model does it.
    pub fn complete_or_toggle(&mut self, id: &str) -> Option<Completion> {
        match self.config.completion_model {
            CompletionModel::Flag => self.toggle_completed(id).map(Completion::Toggled),
            CompletionModel::SeparateList => self.complete(id).then_some(Completion::Moved),
        }
    }

    /// Millisecond timestamp id, bumped past the newest existing one.
    fn next_id(&mut self) -> String {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.last_id = now.max(self.last_id + 1);
        self.last_id.to_string()
    }
}

fn read_list<S: KeyValueStore>(storage: &mut S, key: &str) -> Option<Vec<Task>> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Some(Vec::new()),
        Err(e) => {
            warn!(error = %e, "failed to load, keeping in-memory list");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(list) => Some(list),
        Err(source) => {
            let err = PersistenceError::Parse {
                key: key.to_string(),
                source,
            };
            warn!(error = %err, "starting with an empty list");
            if let Err(e) = storage.quarantine(key) {
                warn!(error = %e, "failed to move malformed data aside");
            }
            Some(Vec::new())
        }
    }
}

/// Numeric ids under `key`, read without touching the stored value.
fn stored_ids<S: KeyValueStore>(storage: &S, key: &str) -> Vec<u64> {
    let Ok(Some(raw)) = storage.get(key) else {
        return Vec::new();
    };
    serde_json::from_str::<Vec<Task>>(&raw)
        .map(|list| list.iter().filter_map(|t| t.id.parse().ok()).collect())
        .unwrap_or_default()
}

fn write_list<S: KeyValueStore>(storage: &mut S, key: &str, list: &[Task]) {
    let data = match serde_json::to_string_pretty(list) {
        Ok(data) => data,
        Err(source) => {
            let err = PersistenceError::Serialize {
                key: key.to_string(),
                source,
            };
            warn!(error = %err, "save skipped");
            return;
        }
    };
    match storage.set(key, &data) {
        Ok(()) => debug!(key, count = list.len(), "saved"),
        Err(e) => warn!(error = %e, "save failed"),
    }
}
