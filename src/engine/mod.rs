//! # Task State Engine
//!
//! Owns the canonical task list and its single undo snapshot, and hands the
//! list to a [`TaskPersistence`] store after every change.
//!
//! ## Undo
//!
//! Every mutation first copies the current state into the backup slot.
//! `undo` swaps current and backup, so a second `undo` redoes the change:
//!
//! ```text
//! A --mutate--> B --undo--> A --undo--> B
//! ```
//!
//! There is one slot, not a history stack.
//!
//! ## Results
//!
//! Mutations return `true` when the store accepted the new state. A store
//! failure leaves the in-memory change in place; it is logged and reported,
//! never retried. Referring to a task ID the engine does not hold is a caller
//! bug and returns [`EngineError::TaskNotFound`].

mod view;

use std::mem;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{Task, TaskId, TaskState};
use crate::storage::TaskPersistence;

pub use view::{SearchQuery, View, ViewKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("A search needs a description or a date range")]
    EmptySearch,
}

/// The mutable task list plus its undo slot
pub struct TaskEngine<S: TaskPersistence> {
    current: TaskState,
    backup: Option<TaskState>,
    store: S,
    case_sensitive: bool,
}

impl<S: TaskPersistence> TaskEngine<S> {
    /// Creates an engine from the store's saved tasks
    pub fn new(store: S) -> Result<Self> {
        let current = store.load().context("Failed to load tasks")?;
        info!("Task engine initialised with {} tasks", current.len());

        Ok(Self {
            current,
            backup: None,
            store,
            case_sensitive: false,
        })
    }

    /// Sets whether description searches are case-sensitive
    pub fn with_case_sensitive_search(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn add(&mut self, task: Task) -> bool {
        self.backup_current();
        info!("Added {}: {}", task.type_label(), task.description);
        self.current.insert(task);
        self.persist()
    }

    /// Replaces the task holding `id` with `new_task`
    ///
    /// `new_task` keeps whatever ID it carries; use [`Task::replaced_with`] to
    /// keep the old identity.
    pub fn edit(&mut self, id: &TaskId, new_task: Task) -> Result<bool, EngineError> {
        let index = self.index_of(id)?;
        self.backup_current();

        info!("Edited #{}: {}", index + 1, new_task.description);
        self.current.replace(index, new_task);
        Ok(self.persist())
    }

    pub fn delete(&mut self, id: &TaskId) -> Result<bool, EngineError> {
        let index = self.index_of(id)?;
        self.backup_current();

        let task = self.current.remove(index);
        info!("Deleted {}: {}", task.type_label(), task.description);
        Ok(self.persist())
    }

    pub fn done(&mut self, id: &TaskId) -> Result<bool, EngineError> {
        self.set_completion(id, true)
    }

    pub fn undone(&mut self, id: &TaskId) -> Result<bool, EngineError> {
        self.set_completion(id, false)
    }

    fn set_completion(&mut self, id: &TaskId, done: bool) -> Result<bool, EngineError> {
        let index = self.index_of(id)?;
        self.backup_current();

        let mut task = self.current.tasks()[index].clone();
        if done {
            task.set_done();
            info!("Done {}: {}", task.type_label(), task.description);
        } else {
            task.clear_done();
            info!("Undone {}: {}", task.type_label(), task.description);
        }
        self.current.replace(index, task);
        Ok(self.persist())
    }

    /// Swaps the current state with the backup; a no-op without a backup
    pub fn undo(&mut self) -> bool {
        let Some(backup) = self.backup.as_mut() else {
            return true;
        };

        mem::swap(&mut self.current, backup);
        info!("Last task operation undone");
        self.persist()
    }

    /// Writes the current state again without changing it
    pub fn save(&mut self) -> bool {
        self.persist()
    }

    /// Moves the store; the task list is untouched
    pub fn set(&mut self, directory: &Path, filename: Option<&str>) -> bool {
        match self.store.set_path(directory, filename) {
            Ok(()) => {
                info!("Save location set to {}", directory.display());
                true
            }
            Err(e) => {
                warn!("Failed to set save location: {:#}", e);
                false
            }
        }
    }

    pub fn has_previous_operation(&self) -> bool {
        self.backup.is_some()
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Returns the canonical tasks in sorted order
    pub fn tasks(&self) -> &[Task] {
        self.current.tasks()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn outstanding(&self) -> View {
        View::new(
            ViewKind::Outstanding,
            self.current.outstanding().cloned().collect(),
        )
    }

    pub fn completed(&self) -> View {
        View::new(ViewKind::Done, self.current.completed().cloned().collect())
    }

    pub fn all(&self) -> View {
        View::new(ViewKind::All, self.current.tasks().to_vec())
    }

    /// Filters the tasks without touching the canonical list
    pub fn search(&self, query: &SearchQuery) -> Result<View, EngineError> {
        if query.is_empty() {
            return Err(EngineError::EmptySearch);
        }
        Ok(self.filter(query))
    }

    /// Recomputes a view of the same kind against the current tasks
    pub fn refresh(&self, view: &View) -> View {
        match view.kind() {
            ViewKind::Outstanding => self.outstanding(),
            ViewKind::Done => self.completed(),
            ViewKind::All => self.all(),
            ViewKind::Search(query) => self.filter(query),
        }
    }

    fn filter(&self, query: &SearchQuery) -> View {
        let tasks = self
            .current
            .tasks()
            .iter()
            .filter(|task| query.matches(task, self.case_sensitive))
            .cloned()
            .collect();
        View::new(ViewKind::Search(query.clone()), tasks)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn index_of(&self, id: &TaskId) -> Result<usize, EngineError> {
        self.current
            .position(id)
            .ok_or_else(|| EngineError::TaskNotFound(id.clone()))
    }

    fn backup_current(&mut self) {
        self.backup = Some(self.current.snapshot());
    }

    fn persist(&mut self) -> bool {
        match self.store.save(&self.current) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save tasks: {:#}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskKind;
    use crate::storage::MemoryStore;
    use chrono::{NaiveDate, NaiveDateTime};
    use proptest::prelude::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn engine() -> TaskEngine<MemoryStore> {
        TaskEngine::new(MemoryStore::new()).unwrap()
    }

    fn descriptions(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.description.as_str()).collect()
    }

    #[test]
    fn loads_from_store() {
        let state = TaskState::new(vec![Task::dream("saved")]);
        let engine = TaskEngine::new(MemoryStore::with_state(state)).unwrap();

        assert_eq!(descriptions(engine.tasks()), vec!["saved"]);
        assert!(!engine.has_previous_operation());
    }

    #[test]
    fn add_sorts_and_persists() {
        let mut engine = engine();
        assert!(engine.add(Task::dream("dream")));
        assert!(engine.add(Task::deadline("later", at(25, 9))));
        assert!(engine.add(Task::deadline("sooner", at(20, 9))));

        assert_eq!(descriptions(engine.tasks()), vec!["sooner", "later", "dream"]);
        assert_eq!(engine.store().save_count(), 3);
        assert_eq!(engine.store().saved().unwrap().tasks(), engine.tasks());
        assert!(engine.has_previous_operation());
    }

    #[test]
    fn edit_replaces_task() {
        let mut engine = engine();
        let task = Task::dream("draft");
        engine.add(task.clone());

        let edited = task.replaced_with("final", TaskKind::Deadline { due: at(21, 9) });
        assert_eq!(engine.edit(&task.id, edited), Ok(true));

        assert_eq!(engine.tasks().len(), 1);
        assert_eq!(engine.tasks()[0].description, "final");
        assert_eq!(engine.tasks()[0].id, task.id);
    }

    #[test]
    fn delete_removes_task() {
        let mut engine = engine();
        let keep = Task::dream("keep");
        let drop = Task::dream("drop");
        engine.add(keep.clone());
        engine.add(drop.clone());

        assert_eq!(engine.delete(&drop.id), Ok(true));
        assert_eq!(descriptions(engine.tasks()), vec!["keep"]);
    }

    #[test]
    fn missing_id_is_an_error() {
        let mut engine = engine();
        engine.add(Task::dream("present"));
        let missing = Task::dream("missing");

        assert_eq!(
            engine.delete(&missing.id),
            Err(EngineError::TaskNotFound(missing.id.clone()))
        );
        assert!(engine.done(&missing.id).is_err());
        assert!(engine.edit(&missing.id, missing.clone()).is_err());
        // The failed call must not replace the undo snapshot
        engine.undo();
        assert!(engine.tasks().is_empty());
    }

    #[test]
    fn done_then_undone_restores_task() {
        let mut engine = engine();
        let task = Task::deadline("report", at(20, 17));
        engine.add(task.clone());

        engine.done(&task.id).unwrap();
        assert!(engine.tasks()[0].is_done());

        engine.undone(&task.id).unwrap();
        assert_eq!(engine.tasks()[0], task);
    }

    #[test]
    fn undo_twice_is_redo() {
        let mut engine = engine();
        engine.add(Task::dream("a"));
        let before = engine.tasks().to_vec();

        engine.add(Task::dream("b"));
        let after = engine.tasks().to_vec();

        assert!(engine.undo());
        assert_eq!(engine.tasks(), before.as_slice());
        assert!(engine.undo());
        assert_eq!(engine.tasks(), after.as_slice());
    }

    #[test]
    fn undo_without_backup_is_noop() {
        let mut engine = engine();
        assert!(engine.undo());
        assert!(engine.tasks().is_empty());
        assert_eq!(engine.store().save_count(), 0);
    }

    #[test]
    fn failed_save_keeps_change() {
        let mut store = MemoryStore::new();
        store.set_failing(true);
        let mut engine = TaskEngine::new(store).unwrap();

        assert!(!engine.add(Task::dream("unsaved")));
        assert_eq!(engine.tasks().len(), 1);
        assert!(!engine.save());
    }

    #[test]
    fn set_delegates_to_store() {
        let mut engine = engine();
        assert!(engine.set(Path::new("/tmp/todo"), Some("list.jsonl")));
        assert_eq!(
            engine.store().location(),
            Some((Path::new("/tmp/todo"), Some("list.jsonl")))
        );
        assert!(!engine.has_previous_operation());
    }

    #[test]
    fn views_filter_by_completion() {
        let mut engine = engine();
        let done = Task::dream("finished");
        engine.add(done.clone());
        engine.add(Task::dream("open"));
        engine.done(&done.id).unwrap();

        assert_eq!(descriptions(engine.outstanding().tasks()), vec!["open"]);
        assert_eq!(descriptions(engine.completed().tasks()), vec!["finished"]);
        assert_eq!(engine.all().len(), 2);
    }

    #[test]
    fn search_by_description_and_range() {
        let mut engine = engine();
        engine.add(Task::deadline("Buy milk", at(20, 9)));
        engine.add(Task::deadline("buy bread", at(25, 9)));
        engine.add(Task::event("camp", at(22, 8), at(24, 20)));
        engine.add(Task::dream("milk the cow"));

        let view = engine.search(&SearchQuery::description("MILK")).unwrap();
        assert_eq!(descriptions(view.tasks()), vec!["Buy milk", "milk the cow"]);

        let view = engine
            .search(&SearchQuery::within("", at(21, 0), at(23, 0), false))
            .unwrap();
        assert_eq!(descriptions(view.tasks()), vec!["camp"]);

        let view = engine
            .search(&SearchQuery::within("buy", at(19, 0), at(26, 0), false))
            .unwrap();
        assert_eq!(descriptions(view.tasks()), vec!["Buy milk", "buy bread"]);
    }

    #[test]
    fn case_sensitive_search() {
        let mut engine = engine().with_case_sensitive_search(true);
        engine.add(Task::dream("Buy milk"));

        let view = engine.search(&SearchQuery::description("buy")).unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn empty_search_is_rejected() {
        let engine = engine();
        assert_eq!(
            engine.search(&SearchQuery::description("")),
            Err(EngineError::EmptySearch)
        );
    }

    #[test]
    fn search_does_not_mutate() {
        let mut engine = engine();
        engine.add(Task::dream("a"));
        let before = engine.tasks().to_vec();
        let saves = engine.store().save_count();

        let view = engine.search(&SearchQuery::description("zzz")).unwrap();
        assert!(view.is_empty());
        assert_eq!(engine.tasks(), before.as_slice());
        assert_eq!(engine.store().save_count(), saves);
    }

    #[test]
    fn refresh_recomputes_same_kind() {
        let mut engine = engine();
        engine.add(Task::dream("milk"));
        let view = engine.search(&SearchQuery::description("milk")).unwrap();

        engine.add(Task::dream("more milk"));
        let refreshed = engine.refresh(&view);
        assert_eq!(refreshed.kind(), view.kind());
        assert_eq!(refreshed.len(), 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(Option<u32>),
        Delete(usize),
        Done(usize),
        Undo,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            proptest::option::of(1u32..28).prop_map(Op::Add),
            (0usize..8).prop_map(Op::Delete),
            (0usize..8).prop_map(Op::Done),
            Just(Op::Undo),
        ]
    }

    proptest! {
        #[test]
        fn tasks_stay_sorted(ops in prop::collection::vec(op(), 0..30)) {
            let mut engine = engine();
            for op in ops {
                match op {
                    Op::Add(Some(day)) => { engine.add(Task::deadline("d", at(day, 9))); }
                    Op::Add(None) => { engine.add(Task::dream("dream")); }
                    Op::Delete(i) => {
                        if let Some(id) = engine.tasks().get(i).map(|t| t.id.clone()) {
                            engine.delete(&id).unwrap();
                        }
                    }
                    Op::Done(i) => {
                        if let Some(id) = engine.tasks().get(i).map(|t| t.id.clone()) {
                            engine.done(&id).unwrap();
                        }
                    }
                    Op::Undo => { engine.undo(); }
                }

                let tasks = engine.tasks();
                prop_assert!(tasks.windows(2).all(|w| w[0] <= w[1]));
                let first_dream = tasks.iter().position(|t| t.kind == TaskKind::Dream);
                if let Some(first) = first_dream {
                    prop_assert!(tasks[first..].iter().all(|t| t.kind == TaskKind::Dream));
                }
            }
        }
    }
}
