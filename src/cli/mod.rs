//! # Command-Line Interface
//!
//! Reads commands as free text, runs them and prints the result.
//!
//! ## Modes
//!
//! | Invocation | Behaviour |
//! |------------|-----------|
//! | `procrastinate add buy milk due 5pm` | Run one command and exit |
//! | `procrastinate` | Interactive: read one command per line from stdin |
//!
//! ## Output Formats
//!
//! `--format` (or `default_format` in the config):
//! - `text` (default) - Human-readable output
//! - `json` - One JSON object per command
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! procrastinate --verbose show all
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod session;
mod summary;

pub use app::{run, Cli};
pub use output::{task_line, Output, OutputFormat};
pub use session::{Feedback, Listing, Session};
pub use summary::{summarize, Category, Entry, Summary, CATEGORY_LIMIT, HELP_LINES};
