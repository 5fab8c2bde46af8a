//! Task form handling for the terminal user interface.
//!
//! `TaskForm` pairs the text inputs shown on screen with the
//! [`FormController`] that owns the draft, and keeps the two in sync.

use chrono::NaiveDate;

use crate::fields::DateFormat;
use crate::form::FormController;
use crate::task::Task;
use crate::tui::input::InputField;

/// Field order in the form.
pub const SUBJECT_FIELD: usize = 0;
pub const TITLE_FIELD: usize = 1;
pub const DEADLINE_FIELD: usize = 2;

const FIELD_COUNT: usize = 3;

/// Task form for creating and editing tasks.
pub struct TaskForm {
    pub controller: FormController,
    pub subject: InputField,
    pub title: InputField,
    pub current_field: usize,
}

impl TaskForm {
    pub fn new(format: DateFormat, today: NaiveDate) -> Self {
        let mut form = Self {
            controller: FormController::new(format, today),
            subject: InputField::new(),
            title: InputField::new(),
            current_field: SUBJECT_FIELD,
        };
        form.update_active_field();
        form
    }

    /// Load a task into the form and switch to edit mode.
    pub fn begin_edit(&mut self, task: &Task) {
        self.controller.begin_edit(task);
        self.reload();
    }

    /// Drop the draft and return to create mode.
    pub fn cancel(&mut self) {
        self.controller.cancel();
        self.reload();
    }

    /// Copy the on-screen text into the draft.
    pub fn sync(&mut self) {
        self.controller.set_subject(&self.subject.value);
        self.controller.set_title(&self.title.value);
    }

    /// Refresh the on-screen text from the draft.
    pub fn reload(&mut self) {
        let draft = self.controller.draft();
        self.subject = InputField::with_value(&draft.subject);
        self.title = InputField::with_value(&draft.title);
        self.current_field = SUBJECT_FIELD;
        self.update_active_field();
    }

    pub fn deadline_display(&self) -> &str {
        &self.controller.draft().deadline_display
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
        self.update_active_field();
    }

    pub fn update_active_field(&mut self) {
        self.subject.active = self.current_field == SUBJECT_FIELD;
        self.title.active = self.current_field == TITLE_FIELD;
    }

    fn current_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            SUBJECT_FIELD => Some(&mut self.subject),
            TITLE_FIELD => Some(&mut self.title),
            _ => None,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.current_input() {
            field.handle_char(c);
        }
    }

    /// Backspace edits text fields and clears the deadline.
    pub fn handle_backspace(&mut self) {
        match self.current_input() {
            Some(field) => field.handle_backspace(),
            None => self.controller.clear_deadline(),
        }
    }

    pub fn handle_delete(&mut self) {
        match self.current_input() {
            Some(field) => field.handle_delete(),
            None => self.controller.clear_deadline(),
        }
    }

    pub fn handle_left_right(&mut self, right: bool) {
        if let Some(field) = self.current_input() {
            if right {
                field.move_cursor_right();
            } else {
                field.move_cursor_left();
            }
        }
    }
}
