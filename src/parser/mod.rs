//! # Command Parser
//!
//! Turns one line of free text into exactly one [`Command`]. Parsing never
//! fails: text that does not fit a known command shape is read as a request
//! to add a new task, and only a missing description, line number or path
//! produces [`Command::Invalid`].
//!
//! ## Pipeline
//!
//! 1. Collapse whitespace.
//! 2. Classify the line ([`CommandStringType`]): a well-formed `set`, then a
//!    trailing `from … to …`, `due …` or `on …` date phrase. A keyword only
//!    counts when the recognizer consumes everything after it as one phrase.
//! 3. Strip the date phrase and its keyword, keeping the separating space so
//!    `delete 1 due today` can be told apart from `delete 1`.
//! 4. Dispatch on the first word.
//! 5. If the first word is unknown or its argument has the wrong shape, prefix
//!    `add ` to the original line and parse once more. A line starting with
//!    `add` never asks for another pass, so there are at most two.
//!
//! ## Escapes
//!
//! A backslash makes the next character literal and is itself dropped from
//! descriptions: `\delete 5 apples` adds a task called `delete 5 apples`.
//! Date detection runs on the raw text, before escapes are removed.

mod date;
mod set_path;

pub use date::{DateMatch, DateRecognizer, NaturalDateRecognizer};
pub use set_path::{parse_set_path_args, SetPathArgs};

use chrono::{NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use crate::command::{Command, InvalidReason};

const COMMAND_ADD: &str = "add";
const COMMAND_EDIT: &str = "edit";
const COMMAND_DELETE: &str = "delete";
const COMMAND_DONE: &str = "done";
const COMMAND_UNDO: &str = "undo";
const COMMAND_SEARCH: &str = "search";
const COMMAND_SHOW: &str = "show";
const COMMAND_SET_PATH: &str = "set";
const COMMAND_HELP: &str = "help";
const COMMAND_EXIT: &str = "procrastinate";

const COMMAND_SHORT_EDIT: &str = "ed";
const COMMAND_SHORT_DELETE: &str = "del";
const COMMAND_SHORT_DONE: &str = "do";
const COMMAND_SHORT_UNDO: &str = "un";
const COMMAND_SHORT_SEARCH: &str = "se";
const COMMAND_SHORT_SHOW: &str = "sh";
const COMMAND_SHORT_EXIT: &str = "exit";

const KEYWORD_DUE_DATE: &str = "due";
const KEYWORD_ON_DATE: &str = "on";
const KEYWORD_FROM_TO_DATE: &str = "from";
const KEYWORD_ALL: &str = "all";
const KEYWORD_DONE: &str = "done";
const KEYWORD_SUMMARY: &str = "summary";
const KEYWORD_EVENTUALLY: &str = "eventually";
const ESCAPE: char = '\\';

/// Phrases the recognizer reads more reliably with an explicit day
const RELATIVE_DATE_FIXES: [(&str, &str); 5] = [
    ("this morning", "today morning"),
    ("this afternoon", "today afternoon"),
    ("this evening", "today evening"),
    ("this night", "today night"),
    ("tonight", "today tonight"),
];

/// Maximum number of passes over one input (the original line, then `add …`)
pub const MAX_PASSES: usize = 2;

/// How a line was classified before dispatching on its first word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStringType {
    NoDate,
    NoDateSetPath,
    OnDate,
    DueDate,
    FromToDate,
}

impl CommandStringType {
    /// The keyword that introduces the date phrase, if any
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            CommandStringType::NoDate | CommandStringType::NoDateSetPath => None,
            CommandStringType::OnDate => Some(KEYWORD_ON_DATE),
            CommandStringType::DueDate => Some(KEYWORD_DUE_DATE),
            CommandStringType::FromToDate => Some(KEYWORD_FROM_TO_DATE),
        }
    }

    fn expected_dates(&self) -> usize {
        match self {
            CommandStringType::FromToDate => 2,
            _ => 1,
        }
    }
}

/// Dates pulled out of a line, with default times already applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateArgs {
    None,
    Single(NaiveDateTime),
    Range(NaiveDateTime, NaiveDateTime),
}

/// The result of classifying a line
#[derive(Debug, Clone, Copy)]
struct Classified {
    string_type: CommandStringType,
    dates: DateArgs,
    /// Byte offset where the date keyword starts (after its leading space)
    keyword_at: Option<usize>,
}

impl Classified {
    fn no_date(string_type: CommandStringType) -> Self {
        Self {
            string_type,
            dates: DateArgs::None,
            keyword_at: None,
        }
    }
}

/// Outcome of a single parsing pass
#[derive(Debug)]
enum Pass {
    Done(Command),
    ReinterpretAsAdd,
}

/// Natural-language command parser
#[derive(Debug, Clone, Default)]
pub struct Parser<R = NaturalDateRecognizer> {
    recognizer: R,
}

impl Parser<NaturalDateRecognizer> {
    /// Creates a parser using the built-in English date recognizer
    pub fn new() -> Self {
        Self::with_recognizer(NaturalDateRecognizer::new())
    }
}

impl<R: DateRecognizer> Parser<R> {
    /// Creates a parser with a custom date recognizer
    pub fn with_recognizer(recognizer: R) -> Self {
        Self { recognizer }
    }

    /// Parses one line of user input
    pub fn parse(&self, input: &str) -> Command {
        debug!("Parsing command: {}", input);

        let original = collapse_whitespace(input);
        let mut line = original.clone();

        for _ in 0..MAX_PASSES {
            match self.parse_pass(&line) {
                Pass::Done(command) => return command,
                Pass::ReinterpretAsAdd => line = put_add_in_front(&original),
            }
        }

        // A line starting with `add` always resolves in one pass
        warn!("Parse did not settle within {} passes: {}", MAX_PASSES, input);
        Command::Invalid(InvalidReason::NoDescription)
    }

    fn parse_pass(&self, line: &str) -> Pass {
        let classified = self.classify(line);
        let command_text = match classified.keyword_at {
            Some(at) => &line[..at],
            None => line,
        };

        if command_text.is_empty() {
            return Pass::Done(Command::Invalid(InvalidReason::NoDescription));
        }

        build_command(command_text, &classified)
    }

    fn classify(&self, line: &str) -> Classified {
        if is_set_path(line) {
            return Classified::no_date(CommandStringType::NoDateSetPath);
        }

        for string_type in [
            CommandStringType::FromToDate,
            CommandStringType::DueDate,
            CommandStringType::OnDate,
        ] {
            if let Some(classified) = self.keyword_dates(line, string_type) {
                return classified;
            }
        }

        Classified::no_date(CommandStringType::NoDate)
    }

    /// Accepts the last `<keyword> <phrase>` in the line if the whole phrase is a date
    fn keyword_dates(&self, line: &str, string_type: CommandStringType) -> Option<Classified> {
        let keyword = string_type.keyword()?;
        let pattern = format!(" {keyword} ");
        let found = line.to_ascii_lowercase().rfind(&pattern)?;

        let phrase = replace_relative_dates(&line[found + pattern.len()..]);
        let matches = self.recognizer.recognize(&phrase);
        let first = matches.first()?;

        // The recognizer finds dates between words too; only a phrase that
        // starts right after the keyword and runs to the end counts
        if first.position != 1
            || first.text != phrase
            || first.dates.len() != string_type.expected_dates()
        {
            return None;
        }

        let dates = fill_dates(first);
        Some(Classified {
            string_type,
            dates,
            keyword_at: Some(found + 1),
        })
    }
}

fn build_command(command_text: &str, classified: &Classified) -> Pass {
    // A stripped date leaves a trailing space, so `no_arguments` is only true
    // when nothing at all followed the command word
    let (raw_first_word, arguments, no_arguments) = match command_text.split_once(' ') {
        Some((word, rest)) => (word, rest, false),
        None => (command_text, "", true),
    };
    let first_word = raw_first_word.to_lowercase();

    let command = match first_word.as_str() {
        COMMAND_ADD => {
            if no_arguments {
                return invalid(InvalidReason::NoDescription);
            }
            let description = clean_description(arguments);
            if description.is_empty() {
                return invalid(InvalidReason::NoDescription);
            }
            add_command(classified.dates, description)
        }

        COMMAND_EDIT | COMMAND_SHORT_EDIT => {
            if no_arguments {
                return invalid(InvalidReason::InvalidLineNumber);
            }
            let mut parts = arguments.splitn(2, ' ');
            let Some(line) = parts.next().and_then(parse_line_number) else {
                return Pass::ReinterpretAsAdd;
            };

            match parts.next() {
                None if classified.string_type == CommandStringType::NoDate => {
                    Command::EditPartial { line }
                }
                raw => match edit_command(line, raw.unwrap_or(""), classified.dates) {
                    Some(command) => command,
                    None => return invalid(InvalidReason::NoDescription),
                },
            }
        }

        COMMAND_DELETE | COMMAND_SHORT_DELETE => {
            if no_arguments {
                return invalid(InvalidReason::InvalidLineNumber);
            }
            match parse_line_number(arguments) {
                Some(line) => Command::Delete { line },
                None => return Pass::ReinterpretAsAdd,
            }
        }

        COMMAND_UNDO | COMMAND_SHORT_UNDO => {
            if !no_arguments {
                return Pass::ReinterpretAsAdd;
            }
            Command::Undo
        }

        COMMAND_DONE | COMMAND_SHORT_DONE => {
            if no_arguments {
                return invalid(InvalidReason::InvalidLineNumber);
            }
            match parse_line_number(arguments) {
                Some(line) => Command::Done { line },
                None => return Pass::ReinterpretAsAdd,
            }
        }

        COMMAND_SEARCH | COMMAND_SHORT_SEARCH => {
            if no_arguments {
                return invalid(InvalidReason::NoDescription);
            }
            let description = clean_description(arguments);
            // `search \` leaves nothing to look for
            if description.is_empty() && matches!(classified.dates, DateArgs::None) {
                return invalid(InvalidReason::NoDescription);
            }
            search_command(classified, description)
        }

        COMMAND_SHOW | COMMAND_SHORT_SHOW => {
            if no_arguments {
                return Pass::Done(Command::ShowOutstanding);
            }
            match arguments.to_lowercase().as_str() {
                KEYWORD_DONE => Command::ShowDone,
                KEYWORD_ALL => Command::ShowAll,
                KEYWORD_SUMMARY => Command::ShowSummary,
                _ => return Pass::ReinterpretAsAdd,
            }
        }

        COMMAND_HELP => {
            if !no_arguments {
                return Pass::ReinterpretAsAdd;
            }
            Command::Help
        }

        COMMAND_SET_PATH => {
            if no_arguments {
                return invalid(InvalidReason::NoPath);
            }
            if classified.string_type != CommandStringType::NoDateSetPath {
                return Pass::ReinterpretAsAdd;
            }
            match parse_set_path_args(arguments) {
                Some(SetPathArgs {
                    directory,
                    filename,
                }) => Command::SetPath {
                    directory,
                    filename,
                },
                None => return Pass::ReinterpretAsAdd,
            }
        }

        COMMAND_EXIT | COMMAND_SHORT_EXIT => {
            if !no_arguments {
                return Pass::ReinterpretAsAdd;
            }
            Command::Exit
        }

        _ => return Pass::ReinterpretAsAdd,
    };

    Pass::Done(command)
}

fn invalid(reason: InvalidReason) -> Pass {
    Pass::Done(Command::Invalid(reason))
}

fn add_command(dates: DateArgs, description: String) -> Command {
    match dates {
        DateArgs::None => Command::AddDream { description },
        DateArgs::Single(due) => Command::AddDeadline { description, due },
        DateArgs::Range(start, end) => Command::AddEvent {
            description,
            start,
            end,
        },
    }
}

/// `None` when a date-less edit has nothing to set
fn edit_command(line: usize, raw_description: &str, dates: DateArgs) -> Option<Command> {
    let description = clean_description(raw_description);

    let command = match dates {
        DateArgs::Single(due) => Command::EditDeadline {
            line,
            description,
            due,
        },
        DateArgs::Range(start, end) => Command::EditEvent {
            line,
            description,
            start,
            end,
        },
        // Compared before escapes are removed so `\eventually` stays literal
        DateArgs::None if raw_description.trim().eq_ignore_ascii_case(KEYWORD_EVENTUALLY) => {
            Command::EditDream { line }
        }
        DateArgs::None if description.is_empty() => return None,
        DateArgs::None => Command::EditTaskDescription { line, description },
    };
    Some(command)
}

fn search_command(classified: &Classified, description: String) -> Command {
    match (classified.string_type, classified.dates) {
        (CommandStringType::OnDate, DateArgs::Single(date)) => {
            Command::SearchOn { description, date }
        }
        (CommandStringType::DueDate, DateArgs::Single(date)) => {
            Command::SearchDue { description, date }
        }
        (_, DateArgs::Range(start, end)) => Command::SearchRange {
            description,
            start,
            end,
        },
        _ => Command::SearchDesc { description },
    }
}

/// Applies default times when the phrase named none
///
/// A single date defaults to the end of its day; a range runs from the start
/// of the first day to the end of the last.
fn fill_dates(found: &DateMatch) -> DateArgs {
    let (start_of_day, end_of_day) = default_times();

    match found.dates.as_slice() {
        [single] if found.time_inferred => DateArgs::Single(single.date().and_time(end_of_day)),
        [single] => DateArgs::Single(*single),
        [start, end] if found.time_inferred => DateArgs::Range(
            start.date().and_time(start_of_day),
            end.date().and_time(end_of_day),
        ),
        [start, end] => DateArgs::Range(*start, *end),
        _ => DateArgs::None,
    }
}

fn default_times() -> (NaiveTime, NaiveTime) {
    (
        NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
        NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
    )
}

fn is_set_path(line: &str) -> bool {
    match line.split_once(' ') {
        Some((first, arguments)) if first.eq_ignore_ascii_case(COMMAND_SET_PATH) => {
            parse_set_path_args(arguments).is_some()
        }
        _ => false,
    }
}

/// Lowercases a date phrase and rewrites the phrases listed in [`RELATIVE_DATE_FIXES`]
fn replace_relative_dates(phrase: &str) -> String {
    let mut phrase = phrase.to_lowercase();
    for (from, to) in RELATIVE_DATE_FIXES {
        phrase = phrase.replace(from, to);
    }
    phrase
}

/// Drops each unescaped backslash, keeping the character after it
fn remove_escape_characters(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut escaped = false;

    for ch in text.chars() {
        if !escaped && ch == ESCAPE {
            escaped = true;
        } else {
            result.push(ch);
            escaped = false;
        }
    }
    result
}

fn clean_description(raw: &str) -> String {
    remove_escape_characters(raw).trim().to_string()
}

/// Positive integers only; no surrounding whitespace
fn parse_line_number(text: &str) -> Option<usize> {
    text.parse::<usize>().ok().filter(|line| *line > 0)
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn put_add_in_front(line: &str) -> String {
    format!("{COMMAND_ADD} {line}")
}
