//! Command implementations for the CLI interface.
//!
//! Each subcommand loads the store from the data directory, performs one
//! intent through the form controller or the action workflow, and prints the
//! result.

use std::io::{self, BufRead, Write};
use std::path::Path;

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::actions::{Action, Applied};
use crate::config::Config;
use crate::dates::{format_deadline_relative, parse_deadline_input};
use crate::error::{Error, Result};
use crate::fields::{CompletionModel, DateFormat};
use crate::form::FormController;
use crate::prompt::{Choice, ConfirmPrompt, DatePicker, Prompt};
use crate::storage::FileStore;
use crate::store::{Completion, ListKind, TaskStore};
use crate::task::Task;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI.
    Ui,

    /// Add a new task.
    Add {
        /// Subject, at least 3 characters.
        subject: String,
        /// Task title.
        title: String,
        /// Deadline: the display format, YYYY-MM-DD, "tomorrow", "friday", "in 3d"...
        #[arg(long)]
        deadline: Option<String>,
    },

    /// List tasks.
    List {
        /// Show the completed list instead of the active one.
        #[arg(long, conflicts_with = "all")]
        completed: bool,
        /// Show both lists.
        #[arg(long)]
        all: bool,
    },

    /// Edit fields on an active task.
    Edit {
        /// Task ID.
        id: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        title: Option<String>,
        /// New deadline (same forms as `add`).
        #[arg(long, conflicts_with = "clear_deadline")]
        deadline: Option<String>,
        /// Remove the deadline.
        #[arg(long)]
        clear_deadline: bool,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Complete a task: toggles the flag or moves it to the completed list.
    Complete {
        /// Task ID.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: String,
        /// Delete from the completed list.
        #[arg(long)]
        completed: bool,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Print the effective configuration.
    Config,

    /// Generate shell completion scripts.
    Completions {
        shell: Shell,
    },
}

/// Asks on stdin, or answers yes without asking.
pub struct StdinPrompt {
    pub assume_yes: bool,
}

impl ConfirmPrompt for StdinPrompt {
    fn ask(&mut self, prompt: &Prompt) -> Choice {
        if self.assume_yes {
            return Choice::Confirm;
        }
        print!(
            "{} [y = {}, n = {}] ",
            prompt.message, prompt.confirm_label, prompt.cancel_label
        );
        if io::stdout().flush().is_err() {
            return Choice::Dismissed;
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => Choice::Dismissed,
            Ok(_) => match line.trim().to_lowercase().as_str() {
                "y" | "yes" => Choice::Confirm,
                _ => Choice::Cancel,
            },
        }
    }
}

/// Date picker backed by a line of text from the command line.
pub struct TextDatePicker<'a> {
    pub input: &'a str,
    pub format: DateFormat,
    pub today: NaiveDate,
}

impl DatePicker for TextDatePicker<'_> {
    fn pick(&mut self, _current: NaiveDate) -> Option<NaiveDate> {
        parse_deadline_input(self.input, self.format, self.today)
    }
}

fn open_store(data_dir: &Path, config: &Config) -> TaskStore<FileStore> {
    TaskStore::open(FileStore::new(data_dir), config.store_config())
}

/// Resolve a deadline argument through a date picker, asking it once.
fn pick_deadline(form: &mut FormController, picker: &mut impl DatePicker, input: &str) -> Result<()> {
    match form.pick_deadline(picker) {
        Some(_) => Ok(()),
        None => Err(Error::InvalidDeadline(input.to_string())),
    }
}

fn text_picker(input: &str, format: DateFormat) -> TextDatePicker<'_> {
    TextDatePicker {
        input,
        format,
        today: Local::now().date_naive(),
    }
}

/// Launch the terminal user interface.
pub fn cmd_ui(data_dir: &Path, config: &Config) -> Result<()> {
    run_tui(data_dir, config)?;
    Ok(())
}

/// Add a new task.
pub fn cmd_add(
    data_dir: &Path,
    config: &Config,
    subject: String,
    title: String,
    deadline: Option<String>,
) -> Result<()> {
    let mut store = open_store(data_dir, config);
    let mut form = FormController::new(config.date_format, Local::now().date_naive());
    form.set_subject(&subject);
    form.set_title(&title);
    if let Some(input) = deadline.as_deref() {
        pick_deadline(&mut form, &mut text_picker(input, config.date_format), input)?;
    }
    let id = form.submit_with(&mut store, &mut StdinPrompt { assume_yes: true })?;
    if let Some(id) = id {
        println!("Added task {}", id);
    }
    Ok(())
}

/// List tasks.
pub fn cmd_list(data_dir: &Path, config: &Config, completed: bool, all: bool) -> Result<()> {
    let store = open_store(data_dir, config);
    let today = Local::now().date_naive();
    let separate = config.completion_model == CompletionModel::SeparateList;

    if !completed || all {
        print_table(store.active(), config, today, false);
    }
    if separate && (completed || all) {
        if all {
            println!();
        }
        println!("Completed ({})", store.completed().len());
        print_table(store.completed(), config, today, true);
    } else if completed && !separate {
        let done: Vec<Task> = store.active().iter().filter(|t| t.completed).cloned().collect();
        print_table(&done, config, today, false);
    }
    Ok(())
}

/// Edit an active task; asks before applying unless `yes`.
pub fn cmd_edit(
    data_dir: &Path,
    config: &Config,
    id: String,
    subject: Option<String>,
    title: Option<String>,
    deadline: Option<String>,
    clear_deadline: bool,
    yes: bool,
) -> Result<()> {
    let mut store = open_store(data_dir, config);
    let task = store.get(&id).cloned().ok_or_else(|| Error::NotFound(id.clone()))?;

    let mut form = FormController::new(config.date_format, Local::now().date_naive());
    form.begin_edit(&task);
    if let Some(subject) = subject.as_deref() {
        form.set_subject(subject);
    }
    if let Some(title) = title.as_deref() {
        form.set_title(title);
    }
    if let Some(input) = deadline.as_deref() {
        pick_deadline(&mut form, &mut text_picker(input, config.date_format), input)?;
    }
    if clear_deadline {
        form.clear_deadline();
    }

    match form.submit_with(&mut store, &mut StdinPrompt { assume_yes: yes })? {
        Some(id) => println!("Updated task {}", id),
        None => println!("Edit cancelled."),
    }
    Ok(())
}

/// Complete a task according to the configured completion model.
pub fn cmd_complete(data_dir: &Path, config: &Config, id: String, yes: bool) -> Result<()> {
    let mut store = open_store(data_dir, config);
    if store.get(&id).is_none() {
        return Err(Error::NotFound(id));
    }
    let request = Action::Complete(id.clone()).request(config.completion_model);
    let Some(confirmed) = request.ask(&mut StdinPrompt { assume_yes: yes }) else {
        println!("Cancelled.");
        return Ok(());
    };
    match confirmed.apply(&mut store) {
        Applied::Completed(Completion::Moved) => println!("Completed {}", id),
        Applied::Completed(Completion::Toggled(true)) => println!("Marked {} done", id),
        Applied::Completed(Completion::Toggled(false)) => println!("Reopened {}", id),
        Applied::Deleted | Applied::Missing => return Err(Error::NotFound(id)),
    }
    Ok(())
}

/// Delete a task from the active or completed list.
pub fn cmd_delete(data_dir: &Path, config: &Config, id: String, completed: bool, yes: bool) -> Result<()> {
    if completed && config.completion_model != CompletionModel::SeparateList {
        return Err(Error::Unsupported(
            "--completed needs the separate-list completion model".to_string(),
        ));
    }
    let mut store = open_store(data_dir, config);
    let wanted = if completed { ListKind::Completed } else { ListKind::Active };
    if !matches!(store.find_any(&id), Some((_, kind)) if kind == wanted) {
        return Err(Error::NotFound(id));
    }

    let action = if completed {
        Action::DeleteCompleted(id.clone())
    } else {
        Action::Delete(id.clone())
    };
    let Some(confirmed) = action
        .request(config.completion_model)
        .ask(&mut StdinPrompt { assume_yes: yes })
    else {
        println!("Cancelled.");
        return Ok(());
    };
    match confirmed.apply(&mut store) {
        Applied::Deleted => println!("Deleted {}", id),
        _ => return Err(Error::NotFound(id)),
    }
    Ok(())
}

/// Print the effective configuration.
pub fn cmd_config(data_dir: &Path, config: &Config) -> Result<()> {
    println!("data_dir         = {}", data_dir.display());
    println!("completion_model = {}", config.completion_model);
    println!("date_format      = {}", config.date_format);
    println!("transition_ms    = {}", config.transition_ms);
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) -> Result<()> {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut io::stdout());
    Ok(())
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[Task], config: &Config, today: NaiveDate, completed_list: bool) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    let last = if completed_list { "Completed" } else { "Due" };
    println!(
        "{:<14} {:<2} {:<16} {:<28} {:<18} {}",
        "ID", "", "Subject", "Title", "Deadline", last
    );
    for t in tasks {
        let mark = if t.completed || t.completed_date.is_some() { "x" } else { " " };
        let tail = if completed_list {
            t.completed_date.clone().unwrap_or_else(|| "-".into())
        } else {
            format_deadline_relative(&t.deadline, config.date_format, today)
        };
        let deadline = if t.deadline.is_empty() { "-" } else { t.deadline.as_str() };
        println!(
            "{:<14} {:<2} {:<16} {:<28} {:<18} {}",
            t.id,
            mark,
            truncate(&t.subject, 16),
            truncate(&t.title, 28),
            deadline,
            tail
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
