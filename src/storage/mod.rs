//! # Storage Layer
//!
//! Persistence for the task list and the user's configuration.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line) | `<save_directory>/<save_filename>` |
//! | Config | TOML | `<home>/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`FileStore`] uses file locking (`fs2`) so two shells never interleave writes
//! - All writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`TaskPersistence`] - What the engine needs from a store
//! - [`FileStore`] - Read/write tasks as JSONL
//! - [`MemoryStore`] - In-memory store for tests and dry runs
//! - [`Config`] - User configuration

mod config;
mod jsonl;
mod memory;

use std::path::Path;

use anyhow::Result;
use thiserror::Error;

use crate::domain::TaskState;

pub use config::{Config, ConfigError, OutputFormat, Settings, DEFAULT_SAVE_FILENAME};
pub use jsonl::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to parse task at line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Task store is unavailable")]
    Unavailable,
}

/// A place the engine can load its tasks from and save them to
///
/// Each call is blocking and either succeeds as a whole or fails as a whole.
pub trait TaskPersistence {
    /// Loads the saved task list; a store that has never been written is empty
    fn load(&self) -> Result<TaskState>;

    /// Replaces the saved task list
    fn save(&mut self, state: &TaskState) -> Result<()>;

    /// Moves the store to `directory`, keeping the current filename when none is given
    fn set_path(&mut self, directory: &Path, filename: Option<&str>) -> Result<()>;
}
