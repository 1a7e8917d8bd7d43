//! Summary grouping and help text

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::domain::{Task, TaskKind};
use crate::engine::View;

/// Most tasks listed under one summary heading
pub const CATEGORY_LIMIT: usize = 5;

/// Days after today that still count as "this week"
const THIS_WEEK_DAYS: i64 = 7;

const CATEGORY_OVERDUE: &str = "Overdue";
const CATEGORY_THIS_WEEK: &str = "This Week";
const CATEGORY_FUTURE: &str = "Future";
const CATEGORY_DREAMS: &str = "Dreams";

/// Command syntax shown by `help`
pub const HELP_LINES: &[(&str, &str)] = &[
    ("add <description>", "Add a dream"),
    ("add <description> due|on <date>", "Add a deadline"),
    ("add <description> from <date> to <date>", "Add an event"),
    ("edit|ed <n>", "Show task <n> as a command to retype"),
    ("edit|ed <n> <description> [dates]", "Change task <n>"),
    ("edit|ed <n> eventually", "Remove the dates from task <n>"),
    ("delete|del <n>", "Delete task <n>"),
    ("done|do <n>", "Mark task <n> done (or not done)"),
    ("undo|un", "Undo the last change"),
    ("search|se <description> [dates]", "Search tasks"),
    ("show|sh [done|all|summary]", "List tasks"),
    ("set <directory> [<filename>]", "Move the task file"),
    ("help", "Show this help"),
    ("procrastinate|exit", "Quit"),
];

/// A task with the line number it has in the outstanding view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub line: usize,
    #[serde(flatten)]
    pub task: Task,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: &'static str,
    pub entries: Vec<Entry>,
    /// Tasks in this category beyond [`CATEGORY_LIMIT`]
    pub hidden: usize,
}

impl Category {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
            hidden: 0,
        }
    }

    fn push(&mut self, line: usize, task: &Task) {
        if self.entries.len() < CATEGORY_LIMIT {
            self.entries.push(Entry {
                line,
                task: task.clone(),
            });
        } else {
            self.hidden += 1;
        }
    }
}

/// Outstanding tasks grouped by urgency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub categories: Vec<Category>,
}

impl Summary {
    /// Returns the category with the given heading
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// Groups a view into Overdue / This Week / Future / Dreams
///
/// A task is overdue once its due instant or event end has passed. Tasks
/// starting before the end of the seventh day from today are "this week".
pub fn summarize(view: &View, now: NaiveDateTime) -> Summary {
    let week_end = (now.date() + Duration::days(THIS_WEEK_DAYS)).and_time(end_of_day());

    let mut overdue = Category::new(CATEGORY_OVERDUE);
    let mut this_week = Category::new(CATEGORY_THIS_WEEK);
    let mut future = Category::new(CATEGORY_FUTURE);
    let mut dreams = Category::new(CATEGORY_DREAMS);

    for (line, task) in view.numbered() {
        let category = match task.kind {
            TaskKind::Dream => &mut dreams,
            TaskKind::Deadline { due } if due < now => &mut overdue,
            TaskKind::Event { end, .. } if end < now => &mut overdue,
            _ if task.kind.primary_date().is_some_and(|d| d <= week_end) => &mut this_week,
            _ => &mut future,
        };
        category.push(line, task);
    }

    Summary {
        categories: vec![overdue, this_week, future, dreams],
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}
