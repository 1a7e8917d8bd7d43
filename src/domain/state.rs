//! Ordered task collection
//!
//! [`TaskState`] owns its tasks outright and keeps them sorted after every
//! mutation, so line numbers derived from it always follow the task ordering.
//! Cloning a state is a structural deep copy: nothing is shared between two
//! states, which is what makes undo snapshots safe.

use super::id::TaskId;
use super::task::Task;

/// A sorted, owned sequence of tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskState {
    tasks: Vec<Task>,
}

impl TaskState {
    /// Creates a state from tasks in any order
    pub fn new(mut tasks: Vec<Task>) -> Self {
        tasks.sort();
        Self { tasks }
    }

    /// Creates an empty state
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns an independent copy for use as an undo snapshot
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Returns the tasks in sorted order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Consumes the state, yielding the sorted tasks
    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    /// Returns the number of tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if there are no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the position of the task with the given ID
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    /// Returns the task with the given ID
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Adds a task
    pub fn insert(&mut self, task: Task) {
        self.tasks.push(task);
        self.tasks.sort();
    }

    /// Replaces the task at `index`, returning the old one
    pub fn replace(&mut self, index: usize, task: Task) -> Task {
        let old = std::mem::replace(&mut self.tasks[index], task);
        self.tasks.sort();
        old
    }

    /// Removes the task at `index`
    pub fn remove(&mut self, index: usize) -> Task {
        self.tasks.remove(index)
    }

    /// Iterates over outstanding tasks
    pub fn outstanding(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.is_done())
    }

    /// Iterates over completed tasks
    pub fn completed(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.is_done())
    }
}

impl FromIterator<Task> for TaskState {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TaskState {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
