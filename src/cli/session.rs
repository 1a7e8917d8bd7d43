//! Command dispatch
//!
//! A [`Session`] ties the parser to the engine. It keeps the view the user
//! last saw, because line numbers in `edit`, `delete` and `done` refer to
//! that view. Every command produces a [`Feedback`] describing what happened
//! and what to show next.

use std::path::Path;

use chrono::{Local, NaiveDateTime};

use super::summary::{summarize, Summary};
use crate::command::Command;
use crate::domain::{Task, TaskKind};
use crate::engine::{EngineError, SearchQuery, TaskEngine, View};
use crate::parser::{DateRecognizer, NaturalDateRecognizer, Parser};
use crate::storage::TaskPersistence;

const FEEDBACK_INVALID_LINE: &str = "Invalid line number";
const FEEDBACK_NOTHING_TO_UNDO: &str = "Nothing to undo";
const FEEDBACK_UNDONE: &str = "Undid last operation";
const FEEDBACK_FAILED_SAVE: &str = " (failed to save)";
const FEEDBACK_EXIT: &str = "Goodbye!";

/// What to display after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Tasks(View),
    Summary(Summary),
    Help,
}

/// The outcome of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub message: String,
    pub listing: Listing,
    /// True once the user asked to quit
    pub exit: bool,
}

/// Parser, engine and the current view
pub struct Session<S: TaskPersistence, R: DateRecognizer = NaturalDateRecognizer> {
    parser: Parser<R>,
    engine: TaskEngine<S>,
    view: View,
    clock: Option<NaiveDateTime>,
}

impl<S: TaskPersistence> Session<S> {
    /// Starts a session on the outstanding tasks, using the local clock
    pub fn new(engine: TaskEngine<S>) -> Self {
        Self::with_parser(engine, Parser::new(), None)
    }

    /// Starts a session where "now" is fixed, for dates and the summary
    pub fn with_reference(engine: TaskEngine<S>, now: NaiveDateTime) -> Self {
        let parser = Parser::with_recognizer(NaturalDateRecognizer::with_reference(now));
        Self::with_parser(engine, parser, Some(now))
    }
}

impl<S: TaskPersistence, R: DateRecognizer> Session<S, R> {
    fn with_parser(engine: TaskEngine<S>, parser: Parser<R>, clock: Option<NaiveDateTime>) -> Self {
        let view = engine.outstanding();
        Self {
            parser,
            engine,
            view,
            clock,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn engine(&self) -> &TaskEngine<S> {
        &self.engine
    }

    /// Parses and runs one line of input
    pub fn execute(&mut self, input: &str) -> Result<Feedback, EngineError> {
        let command = self.parser.parse(input);
        self.run(command)
    }

    /// Runs a parsed command
    ///
    /// Errors only when the engine and the current view disagree about
    /// which tasks exist.
    pub fn run(&mut self, command: Command) -> Result<Feedback, EngineError> {
        match command {
            Command::AddDream { description } => Ok(self.add(Task::dream(description))),
            Command::AddDeadline { description, due } => {
                Ok(self.add(Task::deadline(description, due)))
            }
            Command::AddEvent {
                description,
                start,
                end,
            } => Ok(self.add(Task::event(description, start, end))),

            Command::EditTaskDescription { line, description } => {
                self.edit(line, |task| task.replaced_with(description, task.kind))
            }
            Command::EditDream { line } => self.edit(line, |task| {
                task.replaced_with(task.description.clone(), TaskKind::Dream)
            }),
            Command::EditDeadline {
                line,
                description,
                due,
            } => self.edit(line, |task| {
                task.replaced_with(keep_description(description, task), TaskKind::Deadline { due })
            }),
            Command::EditEvent {
                line,
                description,
                start,
                end,
            } => self.edit(line, |task| {
                task.replaced_with(keep_description(description, task), TaskKind::event(start, end))
            }),
            Command::EditPartial { line } => {
                let message = match self.view.task_at(line) {
                    Some(task) => format!("edit {} {}", line, task.to_command_string()),
                    None => FEEDBACK_INVALID_LINE.to_string(),
                };
                Ok(self.tasks(message))
            }

            Command::Delete { line } => self.delete(line),
            Command::Done { line } => self.toggle_done(line),
            Command::Undo => Ok(self.undo()),

            Command::SearchDesc { description } => self.search(SearchQuery::description(description)),
            Command::SearchOn { description, date } => {
                let day = date.date();
                let (start, end) = (day.and_time(chrono::NaiveTime::MIN), end_of(day));
                self.search(SearchQuery::within(description, start, end, false))
            }
            Command::SearchDue { description, date } => self.search(SearchQuery::within(
                description,
                NaiveDateTime::MIN,
                date,
                false,
            )),
            Command::SearchRange {
                description,
                start,
                end,
            } => self.search(SearchQuery::within(description, start, end, false)),

            Command::ShowOutstanding => Ok(self.show(self.engine.outstanding())),
            Command::ShowDone => Ok(self.show(self.engine.completed())),
            Command::ShowAll => Ok(self.show(self.engine.all())),
            Command::ShowSummary => Ok(self.summary()),

            Command::SetPath {
                directory,
                filename,
            } => Ok(self.set_path(&directory, filename.as_deref())),
            Command::Help => Ok(Feedback {
                message: "Available commands".to_string(),
                listing: Listing::Help,
                exit: false,
            }),
            Command::Exit => Ok(Feedback {
                message: FEEDBACK_EXIT.to_string(),
                listing: Listing::Tasks(self.view.clone()),
                exit: true,
            }),

            Command::Invalid(reason) => Ok(self.tasks(reason.message().to_string())),
        }
    }

    fn add(&mut self, task: Task) -> Feedback {
        let message = format!("Added {}: {}", task.type_label(), task.description);
        let saved = self.engine.add(task);
        self.refreshed(with_save_status(message, saved))
    }

    fn edit(
        &mut self,
        line: usize,
        change: impl FnOnce(&Task) -> Task,
    ) -> Result<Feedback, EngineError> {
        let Some(task) = self.view.task_at(line).cloned() else {
            return Ok(self.tasks(FEEDBACK_INVALID_LINE.to_string()));
        };

        let new_task = change(&task);
        let message = format!("Edited #{}: {}", line, new_task.to_command_string());
        let saved = self.engine.edit(&task.id, new_task)?;
        Ok(self.refreshed(with_save_status(message, saved)))
    }

    fn delete(&mut self, line: usize) -> Result<Feedback, EngineError> {
        let Some(task) = self.view.task_at(line).cloned() else {
            return Ok(self.tasks(FEEDBACK_INVALID_LINE.to_string()));
        };

        let message = format!("Deleted {}: {}", task.type_label(), task.description);
        let saved = self.engine.delete(&task.id)?;
        Ok(self.refreshed(with_save_status(message, saved)))
    }

    /// Marks an outstanding task done, or a done task outstanding again
    fn toggle_done(&mut self, line: usize) -> Result<Feedback, EngineError> {
        let Some(task) = self.view.task_at(line).cloned() else {
            return Ok(self.tasks(FEEDBACK_INVALID_LINE.to_string()));
        };

        let (verb, saved) = if task.is_done() {
            ("Undone", self.engine.undone(&task.id)?)
        } else {
            ("Done", self.engine.done(&task.id)?)
        };
        let message = format!("{} {}: {}", verb, task.type_label(), task.description);
        Ok(self.refreshed(with_save_status(message, saved)))
    }

    fn undo(&mut self) -> Feedback {
        if !self.engine.has_previous_operation() {
            return self.tasks(FEEDBACK_NOTHING_TO_UNDO.to_string());
        }
        let saved = self.engine.undo();
        self.refreshed(with_save_status(FEEDBACK_UNDONE.to_string(), saved))
    }

    fn search(&mut self, query: SearchQuery) -> Result<Feedback, EngineError> {
        let view = self.engine.search(&query)?;
        let message = format!("Found {} task(s)", view.len());
        self.view = view;
        Ok(self.tasks(message))
    }

    fn show(&mut self, view: View) -> Feedback {
        let message = view.kind().title();
        self.view = view;
        self.tasks(message)
    }

    fn summary(&mut self) -> Feedback {
        self.view = self.engine.outstanding();
        let now = self.clock.unwrap_or_else(|| Local::now().naive_local());
        Feedback {
            message: "Summary".to_string(),
            listing: Listing::Summary(summarize(&self.view, now)),
            exit: false,
        }
    }

    fn set_path(&mut self, directory: &str, filename: Option<&str>) -> Feedback {
        let message = if self.engine.set(Path::new(directory), filename) {
            match filename {
                Some(filename) => format!("Save location set to {} ({})", directory, filename),
                None => format!("Save location set to {}", directory),
            }
        } else {
            format!("Failed to set save location to {}", directory)
        };
        self.tasks(message)
    }

    /// Refreshes the current view after a mutation
    fn refreshed(&mut self, message: String) -> Feedback {
        self.view = self.engine.refresh(&self.view);
        self.tasks(message)
    }

    fn tasks(&self, message: String) -> Feedback {
        Feedback {
            message,
            listing: Listing::Tasks(self.view.clone()),
            exit: false,
        }
    }
}

/// An edit with no description keeps the task's current one
fn keep_description(description: String, task: &Task) -> String {
    if description.trim().is_empty() {
        task.description.clone()
    } else {
        description
    }
}

fn with_save_status(message: String, saved: bool) -> String {
    if saved {
        message
    } else {
        message + FEEDBACK_FAILED_SAVE
    }
}

fn end_of(day: chrono::NaiveDate) -> NaiveDateTime {
    day.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| day.and_time(chrono::NaiveTime::MIN))
}
