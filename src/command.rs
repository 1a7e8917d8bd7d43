//! Parsed user commands
//!
//! One variant per user-facing operation, each carrying only the data its
//! handler needs. Commands are plain values; executing them is the job of the
//! session in [`crate::cli`].

use chrono::NaiveDateTime;
use std::fmt;

/// Why a line of input could not become a real command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    NoDescription,
    InvalidLineNumber,
    NoPath,
}

impl InvalidReason {
    /// Returns the corrective message shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            InvalidReason::NoDescription => "Please specify the description",
            InvalidReason::InvalidLineNumber => "Please specify a valid line number",
            InvalidReason::NoPath => "Please specify the save directory path",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A parsed command
///
/// Line numbers are 1-based positions in the most recently shown view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddDream {
        description: String,
    },
    AddDeadline {
        description: String,
        due: NaiveDateTime,
    },
    AddEvent {
        description: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    EditTaskDescription {
        line: usize,
        description: String,
    },
    /// Strip the dates from a task (`edit N eventually`)
    EditDream {
        line: usize,
    },
    /// An empty description keeps the existing one
    EditDeadline {
        line: usize,
        description: String,
        due: NaiveDateTime,
    },
    /// An empty description keeps the existing one
    EditEvent {
        line: usize,
        description: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// `edit N` with nothing else: ask for the task's current contents
    EditPartial {
        line: usize,
    },

    Delete {
        line: usize,
    },
    Done {
        line: usize,
    },
    Undo,

    SearchDesc {
        description: String,
    },
    SearchOn {
        description: String,
        date: NaiveDateTime,
    },
    SearchDue {
        description: String,
        date: NaiveDateTime,
    },
    SearchRange {
        description: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    ShowOutstanding,
    ShowDone,
    ShowAll,
    ShowSummary,

    /// A missing filename keeps the current one
    SetPath {
        directory: String,
        filename: Option<String>,
    },
    Help,
    Exit,

    Invalid(InvalidReason),
}
