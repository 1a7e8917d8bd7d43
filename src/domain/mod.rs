//! Domain models for procrastinate
//!
//! Contains the task entity model and the ordered task collection, without
//! any I/O concerns.

mod id;
mod state;
mod task;

pub use id::{IdError, TaskId};
pub use state::TaskState;
pub use task::{Task, TaskKind, COMMAND_DATE_FORMAT};
