//! In-memory task store

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{StoreError, TaskPersistence};
use crate::domain::TaskState;

/// Keeps saved state in memory and records what was saved
#[derive(Debug, Default)]
pub struct MemoryStore {
    initial: TaskState,
    saved: Option<TaskState>,
    save_count: usize,
    location: Option<(PathBuf, Option<String>)>,
    failing: bool,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that loads the given state
    pub fn with_state(state: TaskState) -> Self {
        Self {
            initial: state,
            ..Self::default()
        }
    }

    /// Makes every later save and path change fail (or succeed again)
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Returns the most recently saved state
    pub fn saved(&self) -> Option<&TaskState> {
        self.saved.as_ref()
    }

    /// Returns how many saves succeeded
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    /// Returns the directory and filename from the last successful `set_path`
    pub fn location(&self) -> Option<(&Path, Option<&str>)> {
        self.location
            .as_ref()
            .map(|(dir, file)| (dir.as_path(), file.as_deref()))
    }
}

impl TaskPersistence for MemoryStore {
    fn load(&self) -> Result<TaskState> {
        Ok(self.saved.clone().unwrap_or_else(|| self.initial.clone()))
    }

    fn save(&mut self, state: &TaskState) -> Result<()> {
        if self.failing {
            return Err(StoreError::Unavailable.into());
        }
        self.saved = Some(state.snapshot());
        self.save_count += 1;
        Ok(())
    }

    fn set_path(&mut self, directory: &Path, filename: Option<&str>) -> Result<()> {
        if self.failing {
            return Err(StoreError::Unavailable.into());
        }
        self.location = Some((directory.to_path_buf(), filename.map(str::to_string)));
        Ok(())
    }
}
