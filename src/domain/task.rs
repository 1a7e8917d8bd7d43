//! Task domain model
//!
//! A task is a description plus one of three temporal shapes: an open-ended
//! dream, a deadline with a single due instant, or an event spanning a start
//! and end instant. All dates are local wall-clock times.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::id::TaskId;

/// Format used when rendering dates back into command syntax
pub const COMMAND_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Temporal shape of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    /// No dates at all
    Dream,
    /// A single due instant
    Deadline { due: NaiveDateTime },
    /// A span; `start <= end` always holds
    Event {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl TaskKind {
    /// Builds an event, ordering the bounds so the span is never inverted
    pub fn event(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        if end < start {
            TaskKind::Event {
                start: end,
                end: start,
            }
        } else {
            TaskKind::Event { start, end }
        }
    }

    /// Returns a short label for the variant
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Dream => "dream",
            TaskKind::Deadline { .. } => "deadline",
            TaskKind::Event { .. } => "event",
        }
    }

    /// Returns the instant this task is sorted by (due date or event start)
    pub fn primary_date(&self) -> Option<NaiveDateTime> {
        match *self {
            TaskKind::Dream => None,
            TaskKind::Deadline { due } => Some(due),
            TaskKind::Event { start, .. } => Some(start),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            TaskKind::Deadline { .. } => 0,
            TaskKind::Event { .. } => 1,
            TaskKind::Dream => 2,
        }
    }

    fn end_date(&self) -> Option<NaiveDateTime> {
        match *self {
            TaskKind::Event { end, .. } => Some(end),
            _ => None,
        }
    }
}

/// A single task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, kept across edits and completion toggles
    pub id: TaskId,

    /// What the task is about
    pub description: String,

    /// Whether the task has been completed
    #[serde(default)]
    pub done: bool,

    /// Dream, deadline or event
    #[serde(flatten)]
    pub kind: TaskKind,
}

impl Task {
    /// Creates a new outstanding task with a fresh ID
    pub fn new(description: impl Into<String>, kind: TaskKind) -> Self {
        let description = description.into().trim().to_string();
        Self {
            id: TaskId::generate(&description),
            description,
            done: false,
            kind,
        }
    }

    /// Creates a dream
    pub fn dream(description: impl Into<String>) -> Self {
        Self::new(description, TaskKind::Dream)
    }

    /// Creates a deadline
    pub fn deadline(description: impl Into<String>, due: NaiveDateTime) -> Self {
        Self::new(description, TaskKind::Deadline { due })
    }

    /// Creates an event
    pub fn event(description: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self::new(description, TaskKind::event(start, end))
    }

    /// Returns a copy carrying this task's ID and completion flag but new content
    pub fn replaced_with(&self, description: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            id: self.id.clone(),
            description: description.into().trim().to_string(),
            done: self.done,
            kind,
        }
    }

    /// Returns true if the task has been completed
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Marks the task as completed
    pub fn set_done(&mut self) {
        self.done = true;
    }

    /// Marks the task as outstanding again
    pub fn clear_done(&mut self) {
        self.done = false;
    }

    /// Returns "dream", "deadline" or "event"
    pub fn type_label(&self) -> &'static str {
        self.kind.label()
    }

    /// Returns true if the task falls inside `[start, end]`
    ///
    /// Dreams are never within a range. Deadlines are within when the due
    /// instant is inside. Events are within when any part of their span
    /// intersects the range (both ends inclusive).
    pub fn is_within(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        match self.kind {
            TaskKind::Dream => false,
            TaskKind::Deadline { due } => start <= due && due <= end,
            TaskKind::Event {
                start: event_start,
                end: event_end,
            } => event_start <= end && event_end >= start,
        }
    }

    /// Case-insensitive description substring test
    pub fn contains(&self, substring: &str) -> bool {
        self.contains_with(substring, false)
    }

    /// Description substring test with explicit case handling
    pub fn contains_with(&self, substring: &str, case_sensitive: bool) -> bool {
        if case_sensitive {
            self.description.contains(substring)
        } else {
            self.description
                .to_lowercase()
                .contains(&substring.to_lowercase())
        }
    }

    /// Renders the task back into the syntax accepted by the parser
    pub fn to_command_string(&self) -> String {
        match self.kind {
            TaskKind::Dream => self.description.clone(),
            TaskKind::Deadline { due } => format!(
                "{} due {}",
                self.description,
                due.format(COMMAND_DATE_FORMAT)
            ),
            TaskKind::Event { start, end } => format!(
                "{} from {} to {}",
                self.description,
                start.format(COMMAND_DATE_FORMAT),
                end.format(COMMAND_DATE_FORMAT)
            ),
        }
    }
}

impl Ord for Task {
    /// Earliest-first for dated tasks, dreams last
    fn cmp(&self, other: &Self) -> Ordering {
        let by_date = match (self.kind.primary_date(), other.kind.primary_date()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };

        by_date
            .then_with(|| self.kind.rank().cmp(&other.kind.rank()))
            .then_with(|| self.kind.end_date().cmp(&other.kind.end_date()))
            .then_with(|| {
                self.description
                    .to_lowercase()
                    .cmp(&other.description.to_lowercase())
            })
            .then_with(|| self.description.cmp(&other.description))
            .then_with(|| self.done.cmp(&other.done))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Task {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn new_task_is_outstanding() {
        let task = Task::dream("  write novel  ");
        assert!(!task.is_done());
        assert_eq!(task.description, "write novel");
        assert_eq!(task.type_label(), "dream");
    }

    #[test]
    fn done_and_clear_done() {
        let mut task = Task::deadline("report", at(20, 17));
        task.set_done();
        assert!(task.is_done());
        task.clear_done();
        assert!(!task.is_done());
        assert_eq!(task.kind, TaskKind::Deadline { due: at(20, 17) });
    }

    #[test]
    fn copy_preserves_identity() {
        let task = Task::event("trip", at(20, 8), at(22, 20));
        let copy = task.clone();
        assert_eq!(copy.id, task.id);
        assert_eq!(copy, task);
    }

    #[test]
    fn replaced_with_keeps_id_and_done() {
        let mut task = Task::dream("old");
        task.set_done();
        let edited = task.replaced_with("new", TaskKind::Deadline { due: at(21, 9) });

        assert_eq!(edited.id, task.id);
        assert!(edited.is_done());
        assert_eq!(edited.description, "new");
    }

    #[test]
    fn event_bounds_are_ordered() {
        let task = Task::event("backwards", at(22, 9), at(20, 9));
        assert_eq!(
            task.kind,
            TaskKind::Event {
                start: at(20, 9),
                end: at(22, 9)
            }
        );
    }

    #[test]
    fn dream_is_never_within() {
        let task = Task::dream("someday");
        assert!(!task.is_within(NaiveDateTime::MIN, NaiveDateTime::MAX));
    }

    #[test]
    fn deadline_within_is_inclusive() {
        let task = Task::deadline("report", at(20, 17));
        assert!(task.is_within(at(20, 17), at(20, 17)));
        assert!(task.is_within(at(19, 0), at(21, 0)));
        assert!(!task.is_within(at(21, 0), at(22, 0)));
    }

    #[test]
    fn event_within_on_any_overlap() {
        let task = Task::event("conference", at(20, 9), at(22, 17));

        // Range entirely inside the event
        assert!(task.is_within(at(21, 0), at(21, 12)));
        // Range overlapping the start
        assert!(task.is_within(at(19, 0), at(20, 9)));
        // Range overlapping the end
        assert!(task.is_within(at(22, 17), at(25, 0)));
        // Disjoint
        assert!(!task.is_within(at(23, 0), at(24, 0)));
        assert!(!task.is_within(at(10, 0), at(20, 8)));
    }

    #[test]
    fn contains_is_case_insensitive_by_default() {
        let task = Task::dream("Buy Milk");
        assert!(task.contains("milk"));
        assert!(task.contains("BUY"));
        assert!(!task.contains("bread"));
        assert!(!task.contains_with("milk", true));
        assert!(task.contains_with("Milk", true));
    }

    #[test]
    fn ordering_dated_before_dreams() {
        let dream = Task::dream("a dream");
        let late = Task::deadline("late", at(25, 9));
        let early = Task::event("early", at(20, 9), at(20, 10));

        let mut tasks = vec![dream.clone(), late.clone(), early.clone()];
        tasks.sort();

        assert_eq!(tasks, vec![early, late, dream]);
    }

    #[test]
    fn ordering_tie_breaks() {
        let deadline = Task::deadline("zeta", at(20, 9));
        let short_event = Task::event("alpha", at(20, 9), at(20, 10));
        let long_event = Task::event("alpha", at(20, 9), at(20, 18));

        let mut tasks = vec![long_event.clone(), short_event.clone(), deadline.clone()];
        tasks.sort();

        // Same start: deadline first, then events by earliest end
        assert_eq!(tasks, vec![deadline, short_event, long_event]);

        let b = Task::dream("Banana");
        let a = Task::dream("apple");
        let mut dreams = vec![b.clone(), a.clone()];
        dreams.sort();
        assert_eq!(dreams, vec![a, b]);
    }

    #[test]
    fn command_string_rendering() {
        assert_eq!(Task::dream("read").to_command_string(), "read");
        assert_eq!(
            Task::deadline("pay rent", at(20, 17)).to_command_string(),
            "pay rent due 2026-10-20 17:00"
        );
        assert_eq!(
            Task::event("camp", at(20, 8), at(22, 20)).to_command_string(),
            "camp from 2026-10-20 08:00 to 2026-10-22 20:00"
        );
    }

    #[test]
    fn serde_roundtrip() {
        for task in [
            Task::dream("d"),
            Task::deadline("dl", at(20, 17)),
            Task::event("ev", at(20, 8), at(21, 8)),
        ] {
            let json = serde_json::to_string(&task).unwrap();
            let parsed: Task = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, task);
        }
    }

    #[test]
    fn serde_layout() {
        let task = Task::deadline("dl", at(20, 17));
        let value = serde_json::to_value(&task).unwrap();

        assert_eq!(value["type"], "deadline");
        assert_eq!(value["due"], "2026-10-20T17:00:00");
        assert_eq!(value["done"], false);
    }
}
