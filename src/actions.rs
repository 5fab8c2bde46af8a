//! Confirm-then-apply workflow for destructive list actions.
//!
//! `Action::request` builds the question, `ActionRequest::decide` turns the
//! answer into a `ConfirmedAction`, and `ConfirmedAction::apply` performs the
//! mutation. The gap between deciding and applying is where the TUI plays its
//! exit transition.

use crate::fields::CompletionModel;
use crate::prompt::{Choice, ConfirmPrompt, Prompt};
use crate::storage::KeyValueStore;
use crate::store::{Completion, TaskStore};

/// A list action that needs the user's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Delete from the active list.
    Delete(String),
    /// Delete from the completed list.
    DeleteCompleted(String),
    /// Toggle (flag model) or move to the completed list (separate-list model).
    Complete(String),
}

/// An action waiting for the user's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: Action,
    pub prompt: Prompt,
}

/// An action the user agreed to; applying it mutates the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedAction(Action);

/// What applying a confirmed action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Deleted,
    Completed(Completion),
    /// The record was already gone.
    Missing,
}

impl Action {
    pub fn id(&self) -> &str {
        match self {
            Action::Delete(id) | Action::DeleteCompleted(id) | Action::Complete(id) => id,
        }
    }

    /// Build the confirmation question for this action.
    pub fn request(self, model: CompletionModel) -> ActionRequest {
        let prompt = match &self {
            Action::Delete(_) | Action::DeleteCompleted(_) => Prompt::new(
                "Confirm Delete",
                "Are you sure you want to delete this task?",
                "Delete",
            ),
            Action::Complete(_) => match model {
                CompletionModel::Flag => Prompt::new(
                    "Confirm",
                    "Toggle the completion of this task?",
                    "Toggle",
                ),
                CompletionModel::SeparateList => Prompt::new(
                    "Confirm Complete",
                    "Mark this task as done?",
                    "Complete",
                ),
            },
        };
        ActionRequest {
            action: self,
            prompt,
        }
    }
}

impl ActionRequest {
    /// Only an explicit confirm lets the action through.
    pub fn decide(self, choice: Choice) -> Option<ConfirmedAction> {
        (choice == Choice::Confirm).then_some(ConfirmedAction(self.action))
    }

    /// Ask `prompt` and decide in one go.
    pub fn ask(self, prompt: &mut impl ConfirmPrompt) -> Option<ConfirmedAction> {
        let choice = prompt.ask(&self.prompt);
        self.decide(choice)
    }
}

impl ConfirmedAction {
    pub fn action(&self) -> &Action {
        &self.0
    }

    pub fn apply<S: KeyValueStore>(self, store: &mut TaskStore<S>) -> Applied {
        match self.0 {
            Action::Delete(id) => {
                if store.remove(&id) {
                    Applied::Deleted
                } else {
                    Applied::Missing
                }
            }
            Action::DeleteCompleted(id) => {
                if store.remove_completed(&id) {
                    Applied::Deleted
                } else {
                    Applied::Missing
                }
            }
            Action::Complete(id) => store
                .complete_or_toggle(&id)
                .map(Applied::Completed)
                .unwrap_or(Applied::Missing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::DateFormat;
    use crate::storage::memory::MemoryStore;
    use crate::store::StoreConfig;
    use crate::task::NewTask;

    fn store_with_one(model: CompletionModel) -> (TaskStore<MemoryStore>, String) {
        let mut store = TaskStore::new(
            MemoryStore::default(),
            StoreConfig {
                completion_model: model,
                date_format: DateFormat::Numeric,
            },
        );
        let id = store
            .add(NewTask {
                subject: "Math".into(),
                title: "HW".into(),
                deadline: String::new(),
            })
            .unwrap();
        (store, id)
    }

    #[test]
    fn cancel_and_dismiss_do_nothing() {
        let (store, id) = store_with_one(CompletionModel::SeparateList);
        let model = store.config().completion_model;
        assert!(Action::Delete(id.clone()).request(model).decide(Choice::Cancel).is_none());
        assert!(Action::Delete(id.clone()).request(model).decide(Choice::Dismissed).is_none());
        assert_eq!(store.active().len(), 1);
    }

    #[test]
    fn confirmed_delete_removes() {
        let (mut store, id) = store_with_one(CompletionModel::SeparateList);
        let confirmed = Action::Delete(id.clone())
            .request(CompletionModel::SeparateList)
            .ask(&mut |_: &Prompt| Choice::Confirm)
            .unwrap();
        assert_eq!(confirmed.action().id(), id);
        assert_eq!(confirmed.clone().apply(&mut store), Applied::Deleted);
        assert_eq!(confirmed.apply(&mut store), Applied::Missing);
        assert!(store.active().is_empty());
    }

    #[test]
    fn complete_then_delete_completed() {
        let (mut store, id) = store_with_one(CompletionModel::SeparateList);
        let model = store.config().completion_model;
        let applied = Action::Complete(id.clone())
            .request(model)
            .decide(Choice::Confirm)
            .unwrap()
            .apply(&mut store);
        assert_eq!(applied, Applied::Completed(Completion::Moved));
        assert_eq!(store.completed().len(), 1);

        let applied = Action::DeleteCompleted(id)
            .request(model)
            .decide(Choice::Confirm)
            .unwrap()
            .apply(&mut store);
        assert_eq!(applied, Applied::Deleted);
        assert!(store.completed().is_empty());
    }

    #[test]
    fn complete_toggles_under_flag_model() {
        let (mut store, id) = store_with_one(CompletionModel::Flag);
        let request = Action::Complete(id.clone()).request(CompletionModel::Flag);
        assert_eq!(request.prompt.confirm_label, "Toggle");
        let applied = request.decide(Choice::Confirm).unwrap().apply(&mut store);
        assert_eq!(applied, Applied::Completed(Completion::Toggled(true)));
        assert!(store.get(&id).unwrap().completed);
    }
}
