//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the task store, the form
//! and the per-row transition table, handles user input, and renders the
//! header, form panel, task lists and dialogs.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::actions::{Action, Applied, ConfirmedAction};
use crate::config::Config;
use crate::dates::format_deadline_relative;
use crate::fields::CompletionModel;
use crate::form::{FormMode, Submitted};
use crate::prompt::Choice;
use crate::storage::FileStore;
use crate::store::{Completion, TaskStore};
use crate::task::Task;
use crate::tui::{
    colors::{BLUE, DARK_BLUE, DARK_RED, GREEN},
    date_picker::{DatePickerState, PickerOutcome},
    enums::{AppState, Focus, PendingConfirm},
    task_form::{TaskForm, DEADLINE_FIELD, SUBJECT_FIELD, TITLE_FIELD},
    transition::{fade_color, slide_offset, TransitionTable},
    utils::centered_rect,
};

/// How long the success banner stays up.
const BANNER_DURATION: Duration = Duration::from_millis(1500);
/// How far a row slides before it disappears, in cells.
const SLIDE_WIDTH: u16 = 12;

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    store: TaskStore<FileStore>,
    config: Config,
    task_form: TaskForm,
    focus: Focus,
    active_state: TableState,
    completed_state: TableState,
    show_completed: bool,
    status_message: String,
    pending: Option<PendingConfirm>,
    notice: Option<String>,
    date_picker: Option<DatePickerState>,
    transitions: TransitionTable,
    banner: Option<(String, Instant)>,
}

impl App {
    /// Create a new App, loading both task lists from `data_dir`.
    pub fn new(data_dir: &Path, config: &Config) -> Self {
        let store = TaskStore::open(FileStore::new(data_dir), config.store_config());
        let mut app = App {
            state: AppState::TaskList,
            store,
            config: config.clone(),
            task_form: TaskForm::new(config.date_format, Local::now().date_naive()),
            focus: Focus::Active,
            active_state: TableState::default(),
            completed_state: TableState::default(),
            show_completed: true,
            status_message: String::new(),
            pending: None,
            notice: None,
            date_picker: None,
            transitions: TransitionTable::new(Duration::from_millis(config.transition_ms)),
            banner: None,
        };
        app.clamp_selection();
        app
    }

    fn model(&self) -> CompletionModel {
        self.config.completion_model
    }

    fn completed_panel_visible(&self) -> bool {
        self.model() == CompletionModel::SeparateList && self.show_completed
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    fn show_banner(&mut self, msg: &str, now: Instant) {
        self.banner = Some((format!("✓ {msg}"), now + BANNER_DURATION));
    }

    fn selected_task(&self) -> Option<&Task> {
        match self.focus {
            Focus::Active => self
                .active_state
                .selected()
                .and_then(|i| self.store.active().get(i)),
            Focus::Completed => self
                .completed_state
                .selected()
                .and_then(|i| self.store.completed().get(i)),
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.selected_task().map(|t| t.id.clone())
    }

    /// Keep both selections inside their lists.
    fn clamp_selection(&mut self) {
        fn clamp(state: &mut TableState, len: usize) {
            if len == 0 {
                state.select(None);
            } else {
                let idx = state.selected().unwrap_or(0).min(len - 1);
                state.select(Some(idx));
            }
        }
        clamp(&mut self.active_state, self.store.active().len());
        clamp(&mut self.completed_state, self.store.completed().len());
    }

    fn move_selection(&mut self, down: bool) {
        let (state, len) = match self.focus {
            Focus::Active => (&mut self.active_state, self.store.active().len()),
            Focus::Completed => (&mut self.completed_state, self.store.completed().len()),
        };
        if len == 0 {
            return;
        }
        let current = state.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(len - 1)
        } else {
            current.saturating_sub(1)
        };
        state.select(Some(next));
    }

    /// Apply finished transitions and expire the banner.
    fn tick(&mut self, now: Instant) {
        for confirmed in self.transitions.take_finished(now) {
            self.apply_action(confirmed, now);
        }
        if matches!(&self.banner, Some((_, until)) if *until <= now) {
            self.banner = None;
        }
    }

    /// Apply confirmed actions whose transition is still running.
    fn finish_transitions(&mut self, now: Instant) {
        for confirmed in self.transitions.drain_pending() {
            self.apply_action(confirmed, now);
        }
    }

    /// Ask for confirmation of a list action on the selected row.
    fn request_action(&mut self, make: fn(String) -> Action) {
        let Some(id) = self.selected_id() else {
            self.set_status_message("No task selected");
            return;
        };
        if self.transitions.is_locked(&id) {
            self.set_status_message("Task is busy");
            return;
        }
        let request = make(id).request(self.model());
        self.pending = Some(PendingConfirm::Action(request));
        self.state = AppState::Confirm;
    }

    /// Run the exit transition, or apply at once when there is nothing to animate.
    fn start_or_apply(&mut self, confirmed: ConfirmedAction, now: Instant) {
        let in_place = self.model() == CompletionModel::Flag
            && matches!(confirmed.action(), Action::Complete(_));
        if self.transitions.is_enabled() && !in_place {
            debug!(id = confirmed.action().id(), "transition started");
            self.transitions.start(confirmed, now);
        } else {
            self.apply_action(confirmed, now);
        }
    }

    fn apply_action(&mut self, confirmed: ConfirmedAction, now: Instant) {
        let id = confirmed.action().id().to_string();
        let applied = confirmed.apply(&mut self.store);
        match applied {
            Applied::Deleted => self.set_status_message("Task deleted"),
            Applied::Completed(Completion::Moved) | Applied::Completed(Completion::Toggled(true)) => {
                self.show_banner("Task completed", now)
            }
            Applied::Completed(Completion::Toggled(false)) => {
                self.set_status_message("Task reopened")
            }
            Applied::Missing => {
                warn!(%id, "action target disappeared");
                self.set_status_message("Task no longer exists");
            }
        }
        let edit_target_gone = self.store.get(&id).is_none()
            && matches!(
                self.task_form.controller.mode(),
                FormMode::Edit { target_id } if *target_id == id
            );
        if edit_target_gone {
            self.task_form.cancel();
            if matches!(self.state, AppState::Form | AppState::DatePicker) {
                self.state = AppState::TaskList;
            }
        }
        self.clamp_selection();
    }

    fn submit_form(&mut self, now: Instant) {
        self.task_form.sync();
        match self.task_form.controller.submit(&mut self.store) {
            Ok(Submitted::Created(_)) => {
                self.task_form.reload();
                self.state = AppState::TaskList;
                self.focus = Focus::Active;
                let last = self.store.active().len().checked_sub(1);
                self.active_state.select(last);
                self.show_banner("Task added", now);
            }
            Ok(Submitted::NeedsConfirmation(prompt)) => {
                self.pending = Some(PendingConfirm::Edit(prompt));
                self.state = AppState::Confirm;
            }
            Err(e) => {
                self.notice = Some(e.to_string());
                self.state = AppState::Notice;
            }
        }
    }

    fn resolve_pending(&mut self, choice: Choice, now: Instant) {
        let Some(pending) = self.pending.take() else {
            self.state = AppState::TaskList;
            return;
        };
        match pending {
            PendingConfirm::Action(request) => {
                self.state = AppState::TaskList;
                if let Some(confirmed) = request.decide(choice) {
                    self.start_or_apply(confirmed, now);
                }
            }
            PendingConfirm::Edit(_) => {
                match self.task_form.controller.resolve_edit(&mut self.store, choice) {
                    Ok(Some(_)) => {
                        self.task_form.reload();
                        self.state = AppState::TaskList;
                        self.show_banner("Task updated", now);
                    }
                    Ok(None) => self.state = AppState::Form,
                    Err(e) => {
                        self.notice = Some(e.to_string());
                        self.state = AppState::Notice;
                    }
                }
            }
        }
    }

    /// Handle keyboard input in the task list. Returns true to quit.
    fn handle_task_list_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Char('a') => {
                if self.task_form.controller.is_editing() {
                    self.task_form.cancel();
                }
                self.state = AppState::Form;
            }
            KeyCode::Char('e') => {
                if self.focus != Focus::Active {
                    self.set_status_message("Completed tasks cannot be edited");
                } else if let Some(task) = self.selected_task().cloned() {
                    if self.transitions.is_locked(&task.id) {
                        self.set_status_message("Task is busy");
                    } else {
                        self.task_form.begin_edit(&task);
                        self.state = AppState::Form;
                    }
                }
            }
            KeyCode::Char('d') => match self.focus {
                Focus::Active => self.request_action(Action::Delete),
                Focus::Completed => self.request_action(Action::DeleteCompleted),
            },
            KeyCode::Char('c') => {
                if self.focus == Focus::Active {
                    self.request_action(Action::Complete);
                } else {
                    self.set_status_message("Task is already completed");
                }
            }
            KeyCode::Tab | KeyCode::BackTab => {
                if self.completed_panel_visible() {
                    self.focus = match self.focus {
                        Focus::Active => Focus::Completed,
                        Focus::Completed => Focus::Active,
                    };
                }
            }
            KeyCode::Char('v') => {
                if self.model() == CompletionModel::SeparateList {
                    self.show_completed = !self.show_completed;
                    if !self.show_completed {
                        self.focus = Focus::Active;
                    }
                } else {
                    self.set_status_message("Completed tasks stay in the list with the flag model");
                }
            }
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    /// Handle keyboard input in the form panel.
    fn handle_form_input(&mut self, key: KeyCode, modifiers: KeyModifiers, now: Instant) {
        match key {
            KeyCode::Esc => {
                self.task_form.cancel();
                self.state = AppState::TaskList;
            }
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.task_form.controller.clear_deadline();
            }
            KeyCode::Enter if self.task_form.current_field == DEADLINE_FIELD => {
                let today = Local::now().date_naive();
                let current = self.task_form.controller.draft().deadline_date;
                self.date_picker = Some(DatePickerState::new(current, today, self.config.date_format));
                self.state = AppState::DatePicker;
            }
            KeyCode::Enter => self.submit_form(now),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
    }

    fn handle_date_picker_input(&mut self, key: KeyCode) {
        let Some(picker) = self.date_picker.as_mut() else {
            self.state = AppState::Form;
            return;
        };
        let picked = match picker.handle_key(key) {
            PickerOutcome::Pending => return,
            PickerOutcome::Picked(date) => Some(date),
            PickerOutcome::Dismissed => None,
        };
        self.task_form.controller.set_deadline(picked);
        self.date_picker = None;
        self.state = AppState::Form;
    }

    fn handle_confirm_input(&mut self, key: KeyCode, now: Instant) {
        let choice = match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Choice::Confirm,
            KeyCode::Char('n') | KeyCode::Char('N') => Choice::Cancel,
            KeyCode::Esc => Choice::Dismissed,
            _ => return,
        };
        self.resolve_pending(choice, now);
    }

    /// Dispatch one key press. Returns true if the application should quit.
    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers, now: Instant) -> bool {
        self.clear_status_message();
        match self.state {
            AppState::TaskList => {
                let quit = self.handle_task_list_input(key, modifiers);
                if quit {
                    self.finish_transitions(now);
                }
                return quit;
            }
            AppState::Form => self.handle_form_input(key, modifiers, now),
            AppState::DatePicker => self.handle_date_picker_input(key),
            AppState::Confirm => self.handle_confirm_input(key, now),
            AppState::Notice => {
                self.notice = None;
                self.state = AppState::Form;
            }
            AppState::Help => {
                if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h')) {
                    self.state = AppState::TaskList;
                }
            }
        }
        false
    }

    /// Poll for and handle keyboard events. Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers, Instant::now()));
                }
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let right = match &self.banner {
            Some((msg, _)) => Span::styled(
                msg.clone(),
                Style::default().fg(GREEN).add_modifier(Modifier::BOLD),
            ),
            None => Span::styled(
                format!(
                    "{} | {}",
                    self.config.completion_model, self.config.date_format
                ),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled("TUGASKU", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            right,
        ]))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(BLUE)))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_form(&self, f: &mut Frame, area: Rect) {
        let editing = matches!(self.state, AppState::Form | AppState::DatePicker);
        let title = if self.task_form.controller.is_editing() {
            "Edit Task"
        } else {
            "New Task ('a')"
        };
        let outer = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(if editing {
                Style::default().fg(BLUE)
            } else {
                Style::default()
            });
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(45),
                Constraint::Percentage(25),
            ])
            .split(inner);

        let field_style = |idx: usize| {
            if editing && self.task_form.current_field == idx {
                Style::default().fg(BLUE)
            } else {
                Style::default()
            }
        };

        let subject = Paragraph::new(self.task_form.subject.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Subject *")
                .border_style(field_style(SUBJECT_FIELD)),
        );
        f.render_widget(subject, chunks[0]);

        let title = Paragraph::new(self.task_form.title.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Title *")
                .border_style(field_style(TITLE_FIELD)),
        );
        f.render_widget(title, chunks[1]);

        let deadline = self.task_form.deadline_display();
        let deadline = Paragraph::new(if deadline.is_empty() { "-" } else { deadline }).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Deadline (Enter)")
                .border_style(field_style(DEADLINE_FIELD)),
        );
        f.render_widget(deadline, chunks[2]);

        if self.state == AppState::Form {
            let (rect, input) = match self.task_form.current_field {
                SUBJECT_FIELD => (chunks[0], &self.task_form.subject),
                TITLE_FIELD => (chunks[1], &self.task_form.title),
                _ => return,
            };
            let max_x = rect.width.saturating_sub(2);
            let x = (input.cursor as u16).min(max_x);
            f.set_cursor_position((rect.x + 1 + x, rect.y + 1));
        }
    }

    /// Slide offset and style of a row, creating its transition entry on first sight.
    fn row_visual(transitions: &mut TransitionTable, id: &str, now: Instant) -> (String, Option<Style>) {
        transitions.ensure(id);
        let progress = transitions.progress(id, now);
        if progress <= 0.0 {
            return (String::new(), None);
        }
        let pad = " ".repeat(slide_offset(progress, SLIDE_WIDTH));
        (pad, Some(Style::default().fg(fade_color(progress))))
    }

    fn render_active_list(&mut self, f: &mut Frame, area: Rect, now: Instant) {
        let today = Local::now().date_naive();
        let flag = self.model() == CompletionModel::Flag;
        let format = self.config.date_format;
        let focused = self.focus == Focus::Active && self.state == AppState::TaskList;

        let mut headers = vec!["Subject", "Title", "Deadline", "Due"];
        if flag {
            headers.insert(0, "Done");
        }
        let header = Row::new(
            headers
                .iter()
                .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))),
        )
        .style(Style::default().bg(BLUE).fg(Color::White))
        .height(1);

        let transitions = &mut self.transitions;
        let rows: Vec<Row> = self
            .store
            .active()
            .iter()
            .map(|task| {
                let (pad, fade) = Self::row_visual(transitions, &task.id, now);
                let mut cells = Vec::with_capacity(5);
                if flag {
                    cells.push(Cell::from(if task.completed { "[x]" } else { "[ ]" }));
                }
                cells.push(Cell::from(format!("{pad}{}", task.subject)));
                cells.push(Cell::from(task.title.clone()));
                cells.push(Cell::from(if task.deadline.is_empty() {
                    "-".to_string()
                } else {
                    task.deadline.clone()
                }));
                cells.push(Cell::from(format_deadline_relative(&task.deadline, format, today)));
                let style = match fade {
                    Some(style) => style,
                    None if flag && task.completed => Style::default().fg(GREEN),
                    None => Style::default().fg(Color::White),
                };
                Row::new(cells).style(style)
            })
            .collect();

        let widths: Vec<Constraint> = if flag {
            vec![
                Constraint::Length(5),
                Constraint::Length(16),
                Constraint::Min(20),
                Constraint::Length(18),
                Constraint::Length(10),
            ]
        } else {
            vec![
                Constraint::Length(16),
                Constraint::Min(20),
                Constraint::Length(18),
                Constraint::Length(10),
            ]
        };

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Tasks ({}) - Press 'h' for help", self.store.active().len()))
                    .border_style(if focused {
                        Style::default().fg(BLUE)
                    } else {
                        Style::default()
                    }),
            )
            .row_highlight_style(if focused {
                Style::default().bg(Color::Gray).fg(Color::Black)
            } else {
                Style::default()
            })
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.active_state);
    }

    fn render_completed_list(&mut self, f: &mut Frame, area: Rect, now: Instant) {
        let focused = self.focus == Focus::Completed && self.state == AppState::TaskList;
        let header = Row::new(
            ["Subject", "Title", "Finished"]
                .iter()
                .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))),
        )
        .style(Style::default().bg(GREEN).fg(Color::Black))
        .height(1);

        let transitions = &mut self.transitions;
        let rows: Vec<Row> = self
            .store
            .completed()
            .iter()
            .map(|task| {
                let (pad, fade) = Self::row_visual(transitions, &task.id, now);
                let finished = task.completed_date.as_deref().unwrap_or("-");
                Row::new(vec![
                    Cell::from(format!("{pad}{}", task.subject)),
                    Cell::from(task.title.clone()),
                    Cell::from(format!("Selesai: {finished}")),
                ])
                .style(fade.unwrap_or_else(|| Style::default().fg(GREEN)))
            })
            .collect();

        let widths = [
            Constraint::Length(16),
            Constraint::Min(16),
            Constraint::Length(22),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Completed ({})", self.store.completed().len()))
                    .border_style(if focused {
                        Style::default().fg(GREEN)
                    } else {
                        Style::default()
                    }),
            )
            .row_highlight_style(if focused {
                Style::default().bg(Color::Gray).fg(Color::Black)
            } else {
                Style::default()
            })
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.completed_state);
    }

    fn render_lists(&mut self, f: &mut Frame, area: Rect, now: Instant) {
        if self.completed_panel_visible() {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(area);
            self.render_active_list(f, chunks[0], now);
            self.render_completed_list(f, chunks[1], now);
        } else {
            self.render_active_list(f, area, now);
        }

        let live: HashSet<&str> = self
            .store
            .active()
            .iter()
            .chain(self.store.completed())
            .map(|t| t.id.as_str())
            .collect();
        self.transitions.retain_ids(&live);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("TugasKu Help", bold)),
            Line::from(""),
            Line::from(Span::styled("Task Lists:", bold)),
            Line::from("  ↑/k, ↓/j     Move selection"),
            Line::from("  a            New task"),
            Line::from("  e            Edit selected task"),
            Line::from("  d            Delete selected task"),
            Line::from("  c            Complete selected task"),
            Line::from("  Tab          Switch between active and completed lists"),
            Line::from("  v            Show/hide completed list"),
            Line::from("  h/F1         Show this help"),
            Line::from("  q/Esc        Quit"),
            Line::from(""),
            Line::from(Span::styled("Form:", bold)),
            Line::from("  Tab/↑↓       Move between fields"),
            Line::from("  Enter        Save (on Deadline: open the calendar)"),
            Line::from("  Ctrl+D       Clear the deadline"),
            Line::from("  Esc          Cancel"),
            Line::from(""),
            Line::from(Span::styled("Calendar:", bold)),
            Line::from("  ←→ day  ↑↓ week  PgUp/PgDn month  t today  Enter pick  Esc cancel"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help - Press Esc to return"),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render a confirmation dialog for the pending question.
    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let Some(pending) = &self.pending else {
            return;
        };
        let prompt = pending.prompt();
        let block = Block::default()
            .title(prompt.title.as_str())
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 25, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                prompt.message.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!(
                "y/Enter: {}   n: {}   Esc: close",
                prompt.confirm_label, prompt.cancel_label
            )),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_notice(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(50, 20, area);
        f.render_widget(Clear, area);
        let text = vec![
            Line::from(""),
            Line::from(self.notice.as_deref().unwrap_or("")),
            Line::from(""),
            Line::from("Press any key to continue"),
        ];
        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .title("Invalid Task")
                    .borders(Borders::ALL)
                    .style(Style::default().bg(DARK_RED)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => format!(
                    "Tasks: {} | Completed: {} | Press 'h' for help",
                    self.store.active().len(),
                    self.store.completed().len()
                ),
                AppState::Form if self.task_form.controller.is_editing() => {
                    "Edit Task | Enter to save, Esc to cancel".to_string()
                }
                AppState::Form => "New Task | Enter to save, Esc to cancel".to_string(),
                AppState::DatePicker => "Pick a deadline".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
                AppState::Notice => "Invalid Task".to_string(),
                AppState::Help => "Help".to_string(),
            }
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(DARK_BLUE).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function.
    fn render(&mut self, f: &mut Frame) {
        let now = Instant::now();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_form(f, chunks[1]);
        if self.state == AppState::Help {
            self.render_help(f, chunks[2]);
        } else {
            self.render_lists(f, chunks[2], now);
        }

        let full = f.area();
        match self.state {
            AppState::DatePicker => {
                if let Some(picker) = &self.date_picker {
                    picker.render(f, full);
                }
            }
            AppState::Confirm => self.render_confirm(f, full),
            AppState::Notice => self.render_notice(f, full),
            _ => {}
        }

        self.render_status_bar(f, chunks[3]);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.tick(Instant::now());
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        self.finish_transitions(Instant::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::DateFormat;
    use tempfile::TempDir;

    fn app(model: CompletionModel, transition_ms: u64) -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let config = Config {
            completion_model: model,
            date_format: DateFormat::Numeric,
            transition_ms,
        };
        let app = App::new(dir.path(), &config);
        (dir, app)
    }

    fn press(app: &mut App, key: KeyCode, now: Instant) -> bool {
        app.handle_key(key, KeyModifiers::NONE, now)
    }

    fn type_text(app: &mut App, text: &str, now: Instant) {
        for c in text.chars() {
            press(app, KeyCode::Char(c), now);
        }
    }

    fn add_task(app: &mut App, subject: &str, title: &str, now: Instant) {
        press(app, KeyCode::Char('a'), now);
        type_text(app, subject, now);
        press(app, KeyCode::Tab, now);
        type_text(app, title, now);
        press(app, KeyCode::Enter, now);
    }

    #[test]
    fn test_add_from_form_shows_banner() {
        let (_dir, mut app) = app(CompletionModel::SeparateList, 0);
        let now = Instant::now();
        add_task(&mut app, "Kimia", "Laporan", now);

        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.store.active().len(), 1);
        assert_eq!(app.store.active()[0].subject, "Kimia");
        assert_eq!(app.active_state.selected(), Some(0));
        assert!(app.banner.is_some());
        assert!(app.task_form.subject.value.is_empty());

        app.tick(now + BANNER_DURATION);
        assert!(app.banner.is_none());
    }

    #[test]
    fn test_validation_error_blocks_until_key() {
        let (_dir, mut app) = app(CompletionModel::SeparateList, 0);
        let now = Instant::now();
        add_task(&mut app, "Ki", "Laporan", now);

        assert_eq!(app.state, AppState::Notice);
        assert!(app.notice.as_deref().unwrap_or("").contains('3'));
        assert!(app.store.active().is_empty());

        press(&mut app, KeyCode::Char('x'), now);
        assert_eq!(app.state, AppState::Form);
        assert_eq!(app.task_form.subject.value, "Ki");
    }

    #[test]
    fn test_delete_waits_for_transition() {
        let (_dir, mut app) = app(CompletionModel::SeparateList, 300);
        let t0 = Instant::now();
        add_task(&mut app, "Biologi", "Sel", t0);
        let id = app.store.active()[0].id.clone();

        press(&mut app, KeyCode::Char('d'), t0);
        assert_eq!(app.state, AppState::Confirm);
        press(&mut app, KeyCode::Char('y'), t0);
        assert_eq!(app.state, AppState::TaskList);
        assert!(app.transitions.is_locked(&id));
        assert_eq!(app.store.active().len(), 1);

        press(&mut app, KeyCode::Char('e'), t0);
        assert_eq!(app.state, AppState::TaskList);

        app.tick(t0 + Duration::from_millis(150));
        assert_eq!(app.store.active().len(), 1);
        app.tick(t0 + Duration::from_millis(300));
        assert!(app.store.active().is_empty());
        assert_eq!(app.active_state.selected(), None);
    }

    #[test]
    fn test_quit_mid_transition_still_applies_action() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            completion_model: CompletionModel::SeparateList,
            date_format: DateFormat::Numeric,
            transition_ms: 300,
        };
        let t0 = Instant::now();
        let (deleted, completed) = {
            let mut app = App::new(dir.path(), &config);
            add_task(&mut app, "Biologi", "Sel", t0);
            add_task(&mut app, "Kimia", "Laporan", t0);
            let deleted = app.store.active()[0].id.clone();
            let completed = app.store.active()[1].id.clone();

            app.active_state.select(Some(0));
            press(&mut app, KeyCode::Char('d'), t0);
            press(&mut app, KeyCode::Char('y'), t0);
            app.active_state.select(Some(1));
            press(&mut app, KeyCode::Char('c'), t0);
            press(&mut app, KeyCode::Char('y'), t0);
            assert_eq!(app.store.active().len(), 2);

            assert!(press(&mut app, KeyCode::Char('q'), t0 + Duration::from_millis(100)));
            (deleted, completed)
        };

        let reopened = TaskStore::open(FileStore::new(dir.path()), config.store_config());
        assert!(reopened.find_any(&deleted).is_none());
        assert!(reopened.active().is_empty());
        assert_eq!(reopened.completed().len(), 1);
        assert_eq!(reopened.completed()[0].id, completed);
    }

    #[test]
    fn test_cancelled_delete_keeps_task() {
        let (_dir, mut app) = app(CompletionModel::SeparateList, 0);
        let now = Instant::now();
        add_task(&mut app, "Sejarah", "Esai", now);
        press(&mut app, KeyCode::Char('d'), now);
        press(&mut app, KeyCode::Esc, now);
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.store.active().len(), 1);
    }

    #[test]
    fn test_complete_moves_to_completed_panel() {
        let (_dir, mut app) = app(CompletionModel::SeparateList, 0);
        let now = Instant::now();
        add_task(&mut app, "Fisika", "Praktikum", now);
        press(&mut app, KeyCode::Char('c'), now);
        press(&mut app, KeyCode::Enter, now);

        assert!(app.store.active().is_empty());
        assert_eq!(app.store.completed().len(), 1);
        assert!(app.store.completed()[0].completed_date.is_some());

        press(&mut app, KeyCode::Tab, now);
        assert_eq!(app.focus, Focus::Completed);
        press(&mut app, KeyCode::Char('d'), now);
        press(&mut app, KeyCode::Char('y'), now);
        assert!(app.store.completed().is_empty());
    }

    #[test]
    fn test_flag_model_toggles_in_place() {
        let (_dir, mut app) = app(CompletionModel::Flag, 300);
        let now = Instant::now();
        add_task(&mut app, "Fisika", "Praktikum", now);
        press(&mut app, KeyCode::Char('c'), now);
        press(&mut app, KeyCode::Char('y'), now);
        assert!(app.store.active()[0].completed);

        press(&mut app, KeyCode::Tab, now);
        assert_eq!(app.focus, Focus::Active);
    }

    #[test]
    fn test_edit_needs_confirmation() {
        let (_dir, mut app) = app(CompletionModel::SeparateList, 0);
        let now = Instant::now();
        add_task(&mut app, "Sejarah", "Esai", now);

        press(&mut app, KeyCode::Char('e'), now);
        assert_eq!(app.state, AppState::Form);
        assert_eq!(app.task_form.subject.value, "Sejarah");
        press(&mut app, KeyCode::Tab, now);
        type_text(&mut app, " 2", now);
        press(&mut app, KeyCode::Enter, now);
        assert_eq!(app.state, AppState::Confirm);

        press(&mut app, KeyCode::Char('n'), now);
        assert_eq!(app.state, AppState::Form);
        assert_eq!(app.store.active()[0].title, "Esai");

        press(&mut app, KeyCode::Enter, now);
        press(&mut app, KeyCode::Char('y'), now);
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.store.active()[0].title, "Esai 2");
        assert!(!app.task_form.controller.is_editing());
    }

    #[test]
    fn test_date_picker_sets_deadline() {
        let (_dir, mut app) = app(CompletionModel::SeparateList, 0);
        let now = Instant::now();
        press(&mut app, KeyCode::Char('a'), now);
        press(&mut app, KeyCode::BackTab, now);
        assert_eq!(app.task_form.current_field, DEADLINE_FIELD);

        press(&mut app, KeyCode::Enter, now);
        assert_eq!(app.state, AppState::DatePicker);
        press(&mut app, KeyCode::Esc, now);
        assert_eq!(app.state, AppState::Form);
        assert_eq!(app.task_form.deadline_display(), "");

        press(&mut app, KeyCode::Enter, now);
        press(&mut app, KeyCode::Enter, now);
        assert!(!app.task_form.deadline_display().is_empty());

        app.handle_key(KeyCode::Char('d'), KeyModifiers::CONTROL, now);
        assert_eq!(app.task_form.deadline_display(), "");
    }

    #[test]
    fn test_quit_keys() {
        let (_dir, mut app) = app(CompletionModel::SeparateList, 0);
        let now = Instant::now();
        assert!(press(&mut app, KeyCode::Char('q'), now));
        press(&mut app, KeyCode::Char('a'), now);
        assert!(!press(&mut app, KeyCode::Char('q'), now));
        assert_eq!(app.task_form.subject.value, "q");
    }
}
