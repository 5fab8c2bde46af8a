//! Enumerations for TUI state management.

use crate::actions::ActionRequest;
use crate::prompt::Prompt;

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    TaskList,
    Form,
    DatePicker,
    Confirm,
    Notice,
    Help,
}

/// Which list has the selection.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    Active,
    Completed,
}

/// A confirmation dialog waiting for an answer.
#[derive(Debug)]
pub enum PendingConfirm {
    /// Delete or complete a task.
    Action(ActionRequest),
    /// Save changes to the task being edited.
    Edit(Prompt),
}

impl PendingConfirm {
    pub fn prompt(&self) -> &Prompt {
        match self {
            PendingConfirm::Action(request) => &request.prompt,
            PendingConfirm::Edit(prompt) => prompt,
        }
    }
}
