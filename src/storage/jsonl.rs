//! JSONL storage for tasks
//!
//! Tasks are stored one JSON object per line, in the same order they are
//! listed. Uses file locking for concurrent access safety.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::info;

use super::config::{Config, DEFAULT_SAVE_FILENAME};
use super::{StoreError, TaskPersistence};
use crate::domain::{Task, TaskState};

/// Store for task data in JSONL format
pub struct FileStore {
    path: PathBuf,
    /// Updated and saved whenever the store moves
    config: Option<Config>,
}

impl FileStore {
    /// Creates a store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: None,
        }
    }

    /// Creates the store named by the configuration
    pub fn from_config(config: Config) -> Self {
        Self {
            path: config.task_file(),
            config: Some(config),
        }
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all tasks from the store, in file order
    pub fn read_all(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open task store: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on task store")?;

        let reader = BufReader::new(&file);
        let mut tasks = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let task: Task = serde_json::from_str(&line).map_err(|source| StoreError::Malformed {
                line: line_num + 1,
                source,
            })?;
            tasks.push(task);
        }

        // Lock is released when file is dropped
        Ok(tasks)
    }

    /// Writes all tasks to the store (full rewrite)
    pub fn write_all(&self, tasks: &[Task]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = temp_path_for(&self.path);

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on task store")?;

            let mut writer = BufWriter::new(&file);

            for task in tasks {
                let line = serde_json::to_string(task).context("Failed to serialize task")?;
                writeln!(writer, "{}", line).context("Failed to write task")?;
            }

            writer.flush().context("Failed to flush task store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    fn current_filename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_SAVE_FILENAME.to_string())
    }

    /// Moves the existing file, falling back to copy + remove across filesystems
    fn move_file(&self, to: &Path) -> Result<()> {
        if fs::rename(&self.path, to).is_ok() {
            return Ok(());
        }

        fs::copy(&self.path, to).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                self.path.display(),
                to.display()
            )
        })?;
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {}", self.path.display()))
    }
}

impl TaskPersistence for FileStore {
    fn load(&self) -> Result<TaskState> {
        Ok(TaskState::new(self.read_all()?))
    }

    fn save(&mut self, state: &TaskState) -> Result<()> {
        self.write_all(state.tasks())
    }

    fn set_path(&mut self, directory: &Path, filename: Option<&str>) -> Result<()> {
        let filename = filename
            .map(str::to_string)
            .unwrap_or_else(|| self.current_filename());
        let new_path = directory.join(&filename);

        if new_path != self.path {
            fs::create_dir_all(directory)
                .with_context(|| format!("Failed to create directory: {}", directory.display()))?;

            if self.path.exists() {
                self.move_file(&new_path)?;
            }
            info!("Task file moved to {}", new_path.display());
            self.path = new_path;
        }

        if let Some(config) = self.config.as_mut() {
            config.set_task_location(directory, Some(&filename));
            config.save()?;
        }

        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_state() -> TaskState {
        let due = chrono::NaiveDate::from_ymd_opt(2026, 10, 20)
            .unwrap()
            .and_hms_opt(17, 0, 0)
            .unwrap();
        TaskState::new(vec![Task::dream("write novel"), Task::deadline("buy milk", due)])
    }

    #[test]
    fn read_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("tasks.jsonl"));

        let state = store.load().unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn save_and_load_preserves_order() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("tasks.jsonl"));
        let state = sample_state();

        store.save(&state).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.tasks()[0].description, "buy milk");
    }

    #[test]
    fn file_holds_one_task_per_line() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("tasks.jsonl"));
        store.save(&sample_state()).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"type\":\"deadline\""));
        assert!(lines[1].contains("\"type\":\"dream\""));
    }

    #[test]
    fn skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("tasks.jsonl"));
        store.save(&sample_state()).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        fs::write(store.path(), format!("\n{}\n\n", content)).unwrap();

        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn malformed_line_names_line_number() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.jsonl");
        let mut store = FileStore::new(&path);
        store.save(&TaskState::new(vec![Task::dream("ok")])).unwrap();

        let mut content = fs::read_to_string(&path).unwrap();
        content.push_str("{not json}\n");
        fs::write(&path, content).unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("nested").join("dir").join("tasks.jsonl"));

        store.save(&sample_state()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn atomic_write() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("tasks.jsonl"));
        store.save(&sample_state()).unwrap();

        // Temp file should not exist after write
        assert!(!temp_path_for(store.path()).exists());
    }

    #[test]
    fn set_path_moves_file() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("tasks.jsonl"));
        store.save(&sample_state()).unwrap();

        let target = dir.path().join("moved");
        store.set_path(&target, Some("todo.jsonl")).unwrap();

        assert_eq!(store.path(), target.join("todo.jsonl"));
        assert!(target.join("todo.jsonl").exists());
        assert!(!dir.path().join("tasks.jsonl").exists());
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn set_path_keeps_filename_when_omitted() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("mine.jsonl"));

        let target = dir.path().join("other");
        store.set_path(&target, None).unwrap();

        assert_eq!(store.path(), target.join("mine.jsonl"));
    }

    #[test]
    fn set_path_records_location_in_config() {
        let dir = TempDir::new().unwrap();
        let config = Config::in_home(dir.path());
        let mut store = FileStore::from_config(config);
        store.save(&sample_state()).unwrap();

        let target = dir.path().join("synced");
        store.set_path(&target, Some("list.jsonl")).unwrap();

        let reloaded = Config::load(Some(dir.path())).unwrap();
        assert_eq!(reloaded.task_file(), target.join("list.jsonl"));
    }
}
