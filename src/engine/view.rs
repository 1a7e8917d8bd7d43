//! Task views
//!
//! A [`View`] is a filtered copy of the task list as it was shown to the
//! user. Line numbers in commands refer to a view, never to the canonical
//! list, so the caller keeps the last view and hands it back.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::{Task, COMMAND_DATE_FORMAT};

/// What to search for
///
/// A description matches by substring. A date range keeps tasks that fall
/// within it and whose completion flag equals `show_done`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub description: Option<String>,
    pub range: Option<(NaiveDateTime, NaiveDateTime)>,
    pub show_done: bool,
}

impl SearchQuery {
    /// Searches descriptions only; an empty description matches nothing useful and is dropped
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: non_empty(description.into()),
            range: None,
            show_done: false,
        }
    }

    /// Searches a date range, optionally narrowed by description
    pub fn within(
        description: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        show_done: bool,
    ) -> Self {
        Self {
            description: non_empty(description.into()),
            range: Some((start, end)),
            show_done,
        }
    }

    /// Returns true if neither a description nor a range is set
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.range.is_none()
    }

    pub(crate) fn matches(&self, task: &Task, case_sensitive: bool) -> bool {
        if let Some(description) = &self.description {
            if !task.contains_with(description, case_sensitive) {
                return false;
            }
        }
        match self.range {
            Some((start, end)) => task.is_within(start, end) && task.is_done() == self.show_done,
            None => true,
        }
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(description) = &self.description {
            parts.push(format!("'{}'", description));
        }
        if let Some((start, end)) = self.range {
            // Open-ended ranges come from "due" searches
            if start == NaiveDateTime::MIN {
                parts.push(format!("due by {}", end.format(COMMAND_DATE_FORMAT)));
            } else {
                parts.push(format!(
                    "from {} to {}",
                    start.format(COMMAND_DATE_FORMAT),
                    end.format(COMMAND_DATE_FORMAT)
                ));
            }
        }
        f.write_str(&parts.join(" "))
    }
}

fn non_empty(text: String) -> Option<String> {
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Which tasks a view shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "query", rename_all = "snake_case")]
pub enum ViewKind {
    Outstanding,
    Done,
    All,
    Search(SearchQuery),
}

impl ViewKind {
    /// Returns a heading for the view
    pub fn title(&self) -> String {
        match self {
            ViewKind::Outstanding => "Outstanding tasks".to_string(),
            ViewKind::Done => "Completed tasks".to_string(),
            ViewKind::All => "All tasks".to_string(),
            ViewKind::Search(query) => format!("Search results for {}", query),
        }
    }
}

/// A snapshot of tasks as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    kind: ViewKind,
    tasks: Vec<Task>,
}

impl View {
    pub(crate) fn new(kind: ViewKind, tasks: Vec<Task>) -> Self {
        Self { kind, tasks }
    }

    pub fn kind(&self) -> &ViewKind {
        &self.kind
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the task shown at a 1-based line number
    pub fn task_at(&self, line: usize) -> Option<&Task> {
        line.checked_sub(1).and_then(|index| self.tasks.get(index))
    }

    /// Iterates over `(line number, task)` pairs
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &Task)> {
        self.tasks.iter().enumerate().map(|(i, t)| (i + 1, t))
    }
}
