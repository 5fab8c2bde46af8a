//! Task data structure and related functionality.
//!
//! This module defines the `Task` record persisted by the store, plus the
//! `NewTask` and `TaskPatch` shapes used to create and edit it.

use serde::{Deserialize, Serialize};

/// A single homework item.
///
/// Both completion models share this record: the flag model uses `completed`,
/// the separate-list model stamps `completed_date` when the task is moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(alias = "mataPelajaran")]
    pub subject: String,
    #[serde(alias = "judulTugas")]
    pub title: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_date: Option<String>,
}

/// Fields collected by the form for a task that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub subject: String,
    pub title: String,
    pub deadline: String,
}

/// Shallow patch applied on edit; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub subject: Option<String>,
    pub title: Option<String>,
    pub deadline: Option<String>,
}

impl Task {
    /// Merge a patch into this record. The id is never touched.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(subject) = patch.subject {
            self.subject = subject;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        Task {
            id: "1".into(),
            subject: "Math".into(),
            title: "HW1".into(),
            deadline: "01/01/2025".into(),
            completed: false,
            completed_date: None,
        }
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut task = sample();
        task.apply(TaskPatch {
            title: Some("HW2".into()),
            ..Default::default()
        });
        assert_eq!(task.id, "1");
        assert_eq!(task.subject, "Math");
        assert_eq!(task.title, "HW2");
        assert_eq!(task.deadline, "01/01/2025");
    }

    #[test]
    fn reads_legacy_field_names() {
        let json = r#"{"id":"1700000000000","mataPelajaran":"Fisika","judulTugas":"Laporan","deadline":"5 Maret 2025","completed":true}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.subject, "Fisika");
        assert_eq!(task.title, "Laporan");
        assert!(task.completed);
        assert_eq!(task.completed_date, None);
    }

    #[test]
    fn writes_camel_case_keys() {
        let mut task = sample();
        task.completed_date = Some("02/01/2025".into());
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["completedDate"], "02/01/2025");
        assert_eq!(value["subject"], "Math");
    }
}
