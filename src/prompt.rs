//! Contracts for the interactive collaborators: the confirmation prompt and
//! the date picker. The TUI and the CLI each provide their own implementations.

use chrono::NaiveDate;

/// The user's answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Confirm,
    Cancel,
    /// The prompt was closed without picking either action.
    Dismissed,
}

/// A yes/no question with labelled actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl Prompt {
    pub fn new(title: &str, message: impl Into<String>, confirm_label: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
            confirm_label: confirm_label.to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

/// Blocking confirmation dialog.
pub trait ConfirmPrompt {
    fn ask(&mut self, prompt: &Prompt) -> Choice;
}

/// Date selection dialog. `None` means the picker was dismissed.
pub trait DatePicker {
    fn pick(&mut self, current: NaiveDate) -> Option<NaiveDate>;
}

impl<F> ConfirmPrompt for F
where
    F: FnMut(&Prompt) -> Choice,
{
    fn ask(&mut self, prompt: &Prompt) -> Choice {
        self(prompt)
    }
}
