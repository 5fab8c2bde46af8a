//! Popup calendar used to choose a deadline.

use chrono::{Datelike, Duration, Months, NaiveDate};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::dates::{format_date, MONTH_NAMES};
use crate::fields::DateFormat;
use crate::tui::colors::BLUE;
use crate::tui::utils::centered_rect;

/// What a key press did to the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerOutcome {
    Pending,
    Picked(NaiveDate),
    Dismissed,
}

pub struct DatePickerState {
    pub date: NaiveDate,
    today: NaiveDate,
    format: DateFormat,
}

impl DatePickerState {
    pub fn new(current: NaiveDate, today: NaiveDate, format: DateFormat) -> Self {
        Self {
            date: current,
            today,
            format,
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> PickerOutcome {
        match key {
            KeyCode::Enter => return PickerOutcome::Picked(self.date),
            KeyCode::Esc => return PickerOutcome::Dismissed,
            KeyCode::Left => self.shift_days(-1),
            KeyCode::Right => self.shift_days(1),
            KeyCode::Up => self.shift_days(-7),
            KeyCode::Down => self.shift_days(7),
            KeyCode::PageUp => {
                if let Some(d) = self.date.checked_sub_months(Months::new(1)) {
                    self.date = d;
                }
            }
            KeyCode::PageDown => {
                if let Some(d) = self.date.checked_add_months(Months::new(1)) {
                    self.date = d;
                }
            }
            KeyCode::Char('t') => self.date = self.today,
            _ => {}
        }
        PickerOutcome::Pending
    }

    fn shift_days(&mut self, days: i64) {
        if let Some(d) = self.date.checked_add_signed(Duration::days(days)) {
            self.date = d;
        }
    }

    /// Calendar rows (Monday first) for the month of the selected date.
    pub fn weeks(&self) -> Vec<[Option<NaiveDate>; 7]> {
        let mut weeks = Vec::new();
        let Some(first) = self.date.with_day(1) else {
            return weeks;
        };
        let mut week = [None; 7];
        let mut day = first;
        while day.month() == first.month() {
            let col = day.weekday().num_days_from_monday() as usize;
            week[col] = Some(day);
            if col == 6 {
                weeks.push(week);
                week = [None; 7];
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        if week.iter().any(Option::is_some) {
            weeks.push(week);
        }
        weeks
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(40, 50, area);
        f.render_widget(Clear, area);

        let mut lines = vec![
            Line::from(Span::styled(
                format!("{} {}", MONTH_NAMES[self.date.month0() as usize], self.date.year()),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(" Mo  Tu  We  Th  Fr  Sa  Su"),
        ];
        for week in self.weeks() {
            let spans: Vec<Span> = week
                .iter()
                .map(|cell| match cell {
                    Some(d) if *d == self.date => Span::styled(
                        format!(" {:>2} ", d.day()),
                        Style::default().bg(BLUE).fg(Color::White).add_modifier(Modifier::BOLD),
                    ),
                    Some(d) if *d == self.today => Span::styled(
                        format!(" {:>2} ", d.day()),
                        Style::default().add_modifier(Modifier::UNDERLINED),
                    ),
                    Some(d) => Span::raw(format!(" {:>2} ", d.day())),
                    None => Span::raw("    "),
                })
                .collect();
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format_date(self.date, self.format),
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from("←→ day  ↑↓ week  PgUp/PgDn month  t today"));
        lines.push(Line::from("Enter pick  Esc cancel"));

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Deadline"))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
    }
}
