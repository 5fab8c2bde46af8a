//! Form controller: the draft that stages a new or edited task.
//!
//! The controller owns no tasks. It validates the draft, then either appends a
//! new record to the store or, in edit mode, asks for confirmation before
//! patching the targeted record.

use chrono::NaiveDate;
use tracing::debug;

use crate::dates::{format_date, parse_date};
use crate::error::ValidationError;
use crate::fields::DateFormat;
use crate::prompt::{Choice, ConfirmPrompt, DatePicker, Prompt};
use crate::storage::KeyValueStore;
use crate::store::{validate, TaskStore};
use crate::task::{NewTask, Task, TaskPatch};

/// Whether the draft creates a task or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { target_id: String },
}

/// Uncommitted form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub subject: String,
    pub title: String,
    /// Deadline as shown to the user; empty when none was picked.
    pub deadline_display: String,
    /// Date the picker opens at.
    pub deadline_date: NaiveDate,
}

/// Result of a successful [`FormController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    /// A new record was appended; the draft is cleared.
    Created(String),
    /// Edit mode: nothing is applied until [`FormController::resolve_edit`].
    NeedsConfirmation(Prompt),
}

pub struct FormController {
    format: DateFormat,
    draft: Draft,
    mode: FormMode,
}

impl FormController {
    pub fn new(format: DateFormat, today: NaiveDate) -> Self {
        Self {
            format,
            draft: Draft {
                subject: String::new(),
                title: String::new(),
                deadline_display: String::new(),
                deadline_date: today,
            },
            mode: FormMode::Create,
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    pub fn set_subject(&mut self, subject: &str) {
        self.draft.subject = subject.to_string();
    }

    pub fn set_title(&mut self, title: &str) {
        self.draft.title = title.to_string();
    }

    /// Accept the date picker's answer; `None` (dismissed) changes nothing.
    pub fn set_deadline(&mut self, picked: Option<NaiveDate>) {
        if let Some(date) = picked {
            self.draft.deadline_date = date;
            self.draft.deadline_display = format_date(date, self.format);
        }
    }

    /// Ask a date picker for the deadline, starting at the current draft date.
    /// Returns what the picker chose; `None` leaves the draft untouched.
    pub fn pick_deadline(&mut self, picker: &mut impl DatePicker) -> Option<NaiveDate> {
        let picked = picker.pick(self.draft.deadline_date);
        self.set_deadline(picked);
        picked
    }

    pub fn clear_deadline(&mut self) {
        self.draft.deadline_display.clear();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(&self.draft.subject, &self.draft.title)
    }

    /// Load a record into the draft and enter edit mode.
    ///
    /// The deadline text is parsed back with the active convention; if it does
    /// not parse, the picker keeps its previous date.
    pub fn begin_edit(&mut self, task: &Task) {
        self.draft.subject = task.subject.clone();
        self.draft.title = task.title.clone();
        self.draft.deadline_display = task.deadline.clone();
        if let Some(date) = parse_date(&task.deadline, self.format) {
            self.draft.deadline_date = date;
        }
        debug!(id = %task.id, "editing task");
        self.mode = FormMode::Edit {
            target_id: task.id.clone(),
        };
    }

    /// Abandon the draft and return to create mode.
    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Validate, then create (create mode) or request confirmation (edit mode).
    pub fn submit<S: KeyValueStore>(
        &mut self,
        store: &mut TaskStore<S>,
    ) -> Result<Submitted, ValidationError> {
        self.validate()?;
        if self.is_editing() {
            return Ok(Submitted::NeedsConfirmation(Prompt::new(
                "Confirm Edit",
                "Are you sure you want to update this task?",
                "Update",
            )));
        }
        let id = store.add(NewTask {
            subject: self.draft.subject.clone(),
            title: self.draft.title.clone(),
            deadline: self.draft.deadline_display.clone(),
        })?;
        self.reset();
        Ok(Submitted::Created(id))
    }

    /// Finish an edit after the confirmation prompt.
    ///
    /// On confirm the patch is applied, the draft cleared and edit mode left;
    /// returns the edited id. Cancel or dismiss keeps the draft as it is.
    pub fn resolve_edit<S: KeyValueStore>(
        &mut self,
        store: &mut TaskStore<S>,
        choice: Choice,
    ) -> Result<Option<String>, ValidationError> {
        let FormMode::Edit { target_id } = &self.mode else {
            return Ok(None);
        };
        if choice != Choice::Confirm {
            return Ok(None);
        }
        let target_id = target_id.clone();
        store.update(
            &target_id,
            TaskPatch {
                subject: Some(self.draft.subject.clone()),
                title: Some(self.draft.title.clone()),
                deadline: Some(self.draft.deadline_display.clone()),
            },
        )?;
        self.reset();
        Ok(Some(target_id))
    }

    /// Submit and, in edit mode, ask `prompt` inline.
    ///
    /// Returns the created or edited id, or `None` when the edit was not confirmed.
    pub fn submit_with<S: KeyValueStore>(
        &mut self,
        store: &mut TaskStore<S>,
        prompt: &mut impl ConfirmPrompt,
    ) -> Result<Option<String>, ValidationError> {
        match self.submit(store)? {
            Submitted::Created(id) => Ok(Some(id)),
            Submitted::NeedsConfirmation(question) => {
                let choice = prompt.ask(&question);
                self.resolve_edit(store, choice)
            }
        }
    }

    fn reset(&mut self) {
        self.draft.subject.clear();
        self.draft.title.clear();
        self.draft.deadline_display.clear();
        self.mode = FormMode::Create;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{CompletionModel, Field};
    use crate::storage::memory::MemoryStore;
    use crate::store::StoreConfig;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
    }

    fn store(format: DateFormat) -> TaskStore<MemoryStore> {
        TaskStore::new(
            MemoryStore::default(),
            StoreConfig {
                completion_model: CompletionModel::SeparateList,
                date_format: format,
            },
        )
    }

    struct FixedPicker(Option<NaiveDate>);

    impl DatePicker for FixedPicker {
        fn pick(&mut self, _current: NaiveDate) -> Option<NaiveDate> {
            self.0
        }
    }

    #[test]
    fn create_clears_draft() {
        let mut store = store(DateFormat::Numeric);
        let mut form = FormController::new(DateFormat::Numeric, today());
        form.set_subject(" Matematika ");
        form.set_title("Latihan 3");
        form.set_deadline(Some(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()));

        let Submitted::Created(id) = form.submit(&mut store).unwrap() else {
            panic!("expected create");
        };
        let task = store.get(&id).unwrap();
        assert_eq!(task.subject, "Matematika");
        assert_eq!(task.deadline, "10/03/2025");
        assert!(form.draft().subject.is_empty());
        assert!(form.draft().deadline_display.is_empty());
        assert_eq!(form.mode(), &FormMode::Create);
    }

    #[test]
    fn invalid_draft_changes_nothing() {
        let mut store = store(DateFormat::Numeric);
        let mut form = FormController::new(DateFormat::Numeric, today());
        form.set_subject("ab");
        form.set_title("x");
        assert_eq!(
            form.submit(&mut store),
            Err(ValidationError::SubjectTooShort { min: 3, actual: 2 })
        );
        assert_eq!(form.draft().subject, "ab");
        assert!(store.active().is_empty());

        form.set_subject("Fisika");
        form.set_title("");
        assert_eq!(
            form.validate(),
            Err(ValidationError::EmptyField { field: Field::Title })
        );
    }

    #[test]
    fn edit_requires_confirmation() {
        let mut store = store(DateFormat::Numeric);
        let mut form = FormController::new(DateFormat::Numeric, today());
        form.set_subject("Math");
        form.set_title("HW1");
        form.submit(&mut store).unwrap();
        let task = store.active()[0].clone();

        form.begin_edit(&task);
        form.set_title("HW2");
        let outcome = form.submit(&mut store).unwrap();
        assert!(matches!(outcome, Submitted::NeedsConfirmation(_)));
        assert_eq!(store.get(&task.id).unwrap().title, "HW1");

        assert_eq!(form.resolve_edit(&mut store, Choice::Cancel).unwrap(), None);
        assert!(form.is_editing());
        assert_eq!(form.draft().title, "HW2");

        let edited = form.resolve_edit(&mut store, Choice::Confirm).unwrap();
        assert_eq!(edited.as_deref(), Some(task.id.as_str()));
        assert_eq!(store.get(&task.id).unwrap().title, "HW2");
        assert_eq!(store.get(&task.id).unwrap().subject, "Math");
        assert!(!form.is_editing());
    }

    #[test]
    fn submit_with_uses_prompt() {
        let mut store = store(DateFormat::Long);
        let mut form = FormController::new(DateFormat::Long, today());
        form.set_subject("Kimia");
        form.set_title("Laporan");
        let id = form
            .submit_with(&mut store, &mut |_: &Prompt| Choice::Dismissed)
            .unwrap()
            .unwrap();

        form.begin_edit(store.get(&id).unwrap());
        form.set_subject("Kimia Organik");
        let mut asked = 0;
        let result = form
            .submit_with(&mut store, &mut |p: &Prompt| {
                asked += 1;
                assert_eq!(p.confirm_label, "Update");
                Choice::Dismissed
            })
            .unwrap();
        assert_eq!(result, None);
        assert_eq!(asked, 1);
        assert_eq!(store.get(&id).unwrap().subject, "Kimia");
    }

    #[test]
    fn begin_edit_overwrites_pending_draft() {
        let mut form = FormController::new(DateFormat::Long, today());
        let a = Task {
            id: "1".into(),
            subject: "Math".into(),
            title: "A".into(),
            deadline: "7 Maret 2025".into(),
            completed: false,
            completed_date: None,
        };
        let b = Task {
            id: "2".into(),
            subject: "Art".into(),
            title: "B".into(),
            deadline: String::new(),
            completed: false,
            completed_date: None,
        };
        form.begin_edit(&a);
        form.begin_edit(&b);
        assert_eq!(form.mode(), &FormMode::Edit { target_id: "2".into() });
        assert_eq!(form.draft().title, "B");
        // Empty deadline keeps the previously parsed date.
        assert_eq!(form.draft().deadline_date, NaiveDate::from_ymd_opt(2025, 3, 7).unwrap());
    }

    #[test]
    fn dismissed_picker_is_noop() {
        let mut form = FormController::new(DateFormat::Numeric, today());
        form.pick_deadline(&mut FixedPicker(None));
        assert!(form.draft().deadline_display.is_empty());
        form.pick_deadline(&mut FixedPicker(NaiveDate::from_ymd_opt(2025, 12, 1)));
        assert_eq!(form.draft().deadline_display, "01/12/2025");
        form.clear_deadline();
        assert!(form.draft().deadline_display.is_empty());
    }

    #[test]
    fn cancel_leaves_edit_mode() {
        let mut form = FormController::new(DateFormat::Numeric, today());
        form.begin_edit(&Task {
            id: "9".into(),
            subject: "Math".into(),
            title: "HW".into(),
            deadline: String::new(),
            completed: false,
            completed_date: None,
        });
        form.cancel();
        assert_eq!(form.mode(), &FormMode::Create);
        assert!(form.draft().title.is_empty());
    }

    proptest! {
        #[test]
        fn prop_begin_edit_recovers_date(days in 0i64..60_000, long in any::<bool>()) {
            let format = if long { DateFormat::Long } else { DateFormat::Numeric };
            let date = NaiveDate::from_ymd_opt(1950, 1, 1).unwrap() + chrono::Duration::days(days);
            let task = Task {
                id: "1".into(),
                subject: "Math".into(),
                title: "HW".into(),
                deadline: format_date(date, format),
                completed: false,
                completed_date: None,
            };
            let mut form = FormController::new(format, today());
            form.begin_edit(&task);
            prop_assert_eq!(form.draft().deadline_date, date);
        }
    }
}
