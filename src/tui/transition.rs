//! Per-task slide-and-fade state, owned by the UI.
//!
//! Entries are keyed by task id, created the first time a row is drawn and
//! dropped once the id leaves the lists. A running transition holds the
//! confirmed action it will apply when it finishes; while it runs the row is
//! locked against further actions.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use ratatui::style::Color;

use crate::actions::ConfirmedAction;

#[derive(Debug, Default)]
struct Transition {
    started: Option<Instant>,
    pending: Option<ConfirmedAction>,
}

#[derive(Debug)]
pub struct TransitionTable {
    duration: Duration,
    entries: HashMap<String, Transition>,
}

impl TransitionTable {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            entries: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.duration.is_zero()
    }

    /// Make sure a row has an entry.
    pub fn ensure(&mut self, id: &str) {
        if !self.entries.contains_key(id) {
            self.entries.insert(id.to_string(), Transition::default());
        }
    }

    /// Start the exit transition for the action's row.
    pub fn start(&mut self, action: ConfirmedAction, now: Instant) {
        let entry = self
            .entries
            .entry(action.action().id().to_string())
            .or_default();
        entry.started = Some(now);
        entry.pending = Some(action);
    }

    /// True while a transition for `id` is running.
    pub fn is_locked(&self, id: &str) -> bool {
        self.entries
            .get(id)
            .map(|t| t.pending.is_some())
            .unwrap_or(false)
    }

    /// 0.0 (not moving) to 1.0 (fully slid out).
    pub fn progress(&self, id: &str, now: Instant) -> f32 {
        let Some(started) = self.entries.get(id).and_then(|t| t.started) else {
            return 0.0;
        };
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(started).as_secs_f32();
        (elapsed / self.duration.as_secs_f32()).min(1.0)
    }

    /// Hand back the actions whose transition has finished.
    pub fn take_finished(&mut self, now: Instant) -> Vec<ConfirmedAction> {
        let done: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, t)| t.pending.is_some())
            .map(|(id, _)| id.clone())
            .filter(|id| self.progress(id, now) >= 1.0)
            .collect();
        done.into_iter()
            .filter_map(|id| {
                let entry = self.entries.get_mut(&id)?;
                entry.started = None;
                entry.pending.take()
            })
            .collect()
    }

    /// Cut every running transition short and hand back its action.
    pub fn drain_pending(&mut self) -> Vec<ConfirmedAction> {
        self.entries
            .values_mut()
            .filter_map(|entry| {
                entry.started = None;
                entry.pending.take()
            })
            .collect()
    }

    /// Forget rows that no longer exist.
    pub fn retain_ids(&mut self, live: &HashSet<&str>) {
        self.entries.retain(|id, _| live.contains(id.as_str()));
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Horizontal offset of a sliding row, in cells.
pub fn slide_offset(progress: f32, width: u16) -> usize {
    (progress.clamp(0.0, 1.0) * width as f32).round() as usize
}

/// Foreground colour of a fading row.
pub fn fade_color(progress: f32) -> Color {
    let p = progress.clamp(0.0, 1.0);
    let level = (255.0 - p * 200.0).round() as u8;
    Color::Rgb(level, level, level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use crate::fields::CompletionModel;
    use crate::prompt::Choice;

    fn confirmed(id: &str) -> ConfirmedAction {
        Action::Delete(id.to_string())
            .request(CompletionModel::SeparateList)
            .decide(Choice::Confirm)
            .unwrap()
    }

    #[test]
    fn test_lifecycle() {
        let mut table = TransitionTable::new(Duration::from_millis(300));
        let t0 = Instant::now();
        table.ensure("a");
        table.ensure("b");
        assert_eq!(table.len(), 2);
        assert!(!table.is_locked("a"));

        table.start(confirmed("a"), t0);
        assert!(table.is_locked("a"));
        assert!(table.take_finished(t0 + Duration::from_millis(100)).is_empty());
        let p = table.progress("a", t0 + Duration::from_millis(150));
        assert!((p - 0.5).abs() < 0.01);

        let done = table.take_finished(t0 + Duration::from_millis(300));
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].action().id(), "a");
        assert!(!table.is_locked("a"));

        let live: HashSet<&str> = ["b"].into_iter().collect();
        table.retain_ids(&live);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_drain_pending_returns_running_actions() {
        let mut table = TransitionTable::new(Duration::from_millis(300));
        let t0 = Instant::now();
        table.ensure("idle");
        table.start(confirmed("a"), t0);
        table.start(confirmed("b"), t0);

        let mut ids: Vec<String> = table
            .drain_pending()
            .iter()
            .map(|c| c.action().id().to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(!table.is_locked("a"));
        assert!(table.drain_pending().is_empty());
        assert!(table.take_finished(t0 + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut table = TransitionTable::new(Duration::ZERO);
        assert!(!table.is_enabled());
        let now = Instant::now();
        table.start(confirmed("x"), now);
        assert_eq!(table.take_finished(now).len(), 1);
    }

    #[test]
    fn test_visuals() {
        assert_eq!(slide_offset(0.0, 40), 0);
        assert_eq!(slide_offset(0.5, 40), 20);
        assert_eq!(slide_offset(2.0, 40), 40);
        assert_eq!(fade_color(0.0), Color::Rgb(255, 255, 255));
        assert_eq!(fade_color(1.0), Color::Rgb(55, 55, 55));
    }
}
