//! Deadline formatting and parsing.
//!
//! Deadlines are stored as display strings in one of two conventions, so every
//! conversion between a `NaiveDate` and its text goes through this module.

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::fields::DateFormat;

/// Month names used by the long convention.
pub const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Format a date for display in the given convention.
pub fn format_date(date: NaiveDate, format: DateFormat) -> String {
    match format {
        DateFormat::Long => format!(
            "{} {} {}",
            date.day(),
            MONTH_NAMES[date.month0() as usize],
            date.year()
        ),
        DateFormat::Numeric => format!("{:02}/{:02}/{}", date.day(), date.month(), date.year()),
    }
}

/// Parse a display string back into a date.
///
/// Returns `None` when the text does not follow `format` or names an
/// impossible day.
pub fn parse_date(s: &str, format: DateFormat) -> Option<NaiveDate> {
    let s = s.trim();
    match format {
        DateFormat::Long => {
            let parts: Vec<&str> = s.split_whitespace().collect();
            if parts.len() != 3 {
                return None;
            }
            let day = parts[0].parse::<u32>().ok()?;
            let month = MONTH_NAMES
                .iter()
                .position(|m| m.eq_ignore_ascii_case(parts[1]))? as u32
                + 1;
            let year = parts[2].parse::<i32>().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
        DateFormat::Numeric => {
            let parts: Vec<&str> = s.split('/').map(str::trim).collect();
            if parts.len() != 3 {
                return None;
            }
            let day = parts[0].parse::<u32>().ok()?;
            let month = parts[1].parse::<u32>().ok()?;
            let year = parts[2].parse::<i32>().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
    }
}

/// Parse human-readable deadline input with natural language support.
///
/// Supports:
/// - the active display convention and "YYYY-MM-DD"
/// - "today", "tomorrow", "yesterday"
/// - "monday", "next monday", "this friday", etc.
/// - "this weekend", "end of week", "end of month"
/// - "in 3d", "in 2w", "in 1m"
pub fn parse_deadline_input(s: &str, format: DateFormat, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(date) = parse_date(s, format) {
        return Some(date);
    }

    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => {
            let (_, end) = start_end_of_this_week(today);
            return Some(end);
        }
        "end of month" | "eom" => {
            let first = today.with_day(1)?;
            return Some(first.checked_add_months(Months::new(1))? - Duration::days(1));
        }
        "this weekend" | "weekend" => {
            let days_until_saturday = (5 + 7 - today.weekday().num_days_from_monday()) % 7;
            return Some(today + Duration::days(days_until_saturday as i64));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        if let Some(n) = rest.strip_suffix('d') {
            if let Ok(days) = n.trim().parse::<i64>() {
                return Duration::try_days(days).and_then(|d| today.checked_add_signed(d));
            }
        }
        if let Some(n) = rest.strip_suffix('w') {
            if let Ok(weeks) = n.trim().parse::<i64>() {
                return Duration::try_weeks(weeks).and_then(|d| today.checked_add_signed(d));
            }
        }
        if let Some(n) = rest.strip_suffix('m') {
            if let Ok(months) = n.trim().parse::<u32>() {
                return today.checked_add_months(Months::new(months));
            }
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];

    let current_day = today.weekday().num_days_from_monday() as i64;
    for (day_name, target_day) in weekdays {
        let days_ahead = (target_day + 7 - current_day) % 7;
        if s == day_name || s == format!("this {}", day_name) {
            return Some(today + Duration::days(days_ahead));
        }
        if s == format!("next {}", day_name) {
            let days_to_add = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return Some(today + Duration::days(days_to_add));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Calculate the start and end dates of the current ISO week (Monday to Sunday).
pub fn start_end_of_this_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let weekday = today.weekday().num_days_from_monday() as i64;
    let start = today - Duration::days(weekday);
    (start, start + Duration::days(6))
}

/// Format a stored deadline relative to today ("today", "tomorrow", "in 3d", "2d late").
///
/// Deadlines that do not parse are shown verbatim; empty ones as "-".
pub fn format_deadline_relative(deadline: &str, format: DateFormat, today: NaiveDate) -> String {
    if deadline.trim().is_empty() {
        return "-".into();
    }
    let Some(date) = parse_date(deadline, format) else {
        return deadline.to_string();
    };
    let days = (date - today).num_days();
    match days {
        0 => "today".into(),
        1 => "tomorrow".into(),
        d if d > 1 => format!("in {}d", d),
        d => format!("{}d late", -d),
    }
}
