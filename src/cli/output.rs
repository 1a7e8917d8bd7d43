//! Output formatting for CLI commands

use std::io::{self, Write};

use serde::Serialize;

use super::session::{Feedback, Listing};
use super::summary::{Summary, HELP_LINES};
use crate::domain::{Task, TaskKind};
use crate::engine::View;
use crate::storage;

const LIST_DATE_FORMAT: &str = "%a %d %b %H:%M";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// A task with its line number, as listed in JSON output
#[derive(Serialize)]
struct Numbered<'a> {
    line: usize,
    #[serde(flatten)]
    task: &'a Task,
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints the result of one command
    pub fn feedback(&self, feedback: &Feedback) {
        match self.format {
            OutputFormat::Text => {
                println!("{}", feedback.message);
                match &feedback.listing {
                    Listing::Tasks(view) => self.print_view(view),
                    Listing::Summary(summary) => self.print_summary(summary),
                    Listing::Help => self.print_help(),
                }
            }
            OutputFormat::Json => {
                let listing = match &feedback.listing {
                    Listing::Tasks(view) => view_json(view),
                    Listing::Summary(summary) => serde_json::json!({ "summary": summary }),
                    Listing::Help => serde_json::json!({
                        "help": HELP_LINES
                            .iter()
                            .map(|(usage, about)| serde_json::json!({ "usage": usage, "about": about }))
                            .collect::<Vec<_>>(),
                    }),
                };
                self.data(&serde_json::json!({
                    "message": feedback.message,
                    "exit": feedback.exit,
                    "listing": listing,
                }));
            }
        }
    }

    /// Prints a view on its own (the interactive start screen)
    pub fn view(&self, view: &View) {
        match self.format {
            OutputFormat::Text => self.print_view(view),
            OutputFormat::Json => self.data(&view_json(view)),
        }
    }

    /// Prints the interactive prompt (text only)
    pub fn prompt(&self) {
        if self.format == OutputFormat::Text {
            print!("> ");
            let _ = io::stdout().flush();
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    fn print_view(&self, view: &View) {
        println!();
        println!("{}:", view.kind().title());
        if view.is_empty() {
            println!("  (no tasks)");
        }
        for (line, task) in view.numbered() {
            println!("{}", task_line(line, task));
        }
    }

    fn print_summary(&self, summary: &Summary) {
        for category in &summary.categories {
            println!();
            println!("{}:", category.name);
            if category.entries.is_empty() {
                println!("  (none)");
            }
            for entry in &category.entries {
                println!("{}", task_line(entry.line, &entry.task));
            }
            if category.hidden > 0 {
                println!("  ... and {} more", category.hidden);
            }
        }
    }

    fn print_help(&self) {
        let width = HELP_LINES.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
        for (usage, about) in HELP_LINES {
            println!("  {:<width$}  {}", usage, about, width = width);
        }
    }
}

fn view_json(view: &View) -> serde_json::Value {
    let tasks: Vec<_> = view
        .numbered()
        .map(|(line, task)| Numbered { line, task })
        .collect();
    serde_json::json!({
        "view": view.kind(),
        "tasks": tasks,
    })
}

/// Formats one numbered task for text output
pub fn task_line(line: usize, task: &Task) -> String {
    let mark = if task.is_done() { "x" } else { " " };
    let when = match task.kind {
        TaskKind::Dream => String::new(),
        TaskKind::Deadline { due } => format!("  (due {})", due.format(LIST_DATE_FORMAT)),
        TaskKind::Event { start, end } => format!(
            "  ({} - {})",
            start.format(LIST_DATE_FORMAT),
            end.format(LIST_DATE_FORMAT)
        ),
    };
    format!("{:>3}. [{}] {}{}", line, mark, task.description, when)
}
