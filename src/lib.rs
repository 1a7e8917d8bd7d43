//! procrastinate - a natural-language todo list
//!
//! Free text such as `add buy milk due 5pm tomorrow` is parsed into a
//! [`Command`], which a [`cli::Session`] applies to a [`TaskEngine`]. The
//! engine keeps the task list sorted, holds one undo snapshot and saves every
//! change through a [`storage::TaskPersistence`] store.

pub mod domain;
pub mod command;
pub mod parser;
pub mod engine;
pub mod storage;
pub mod cli;

pub use command::{Command, InvalidReason};
pub use domain::{Task, TaskId, TaskKind, TaskState};
pub use engine::{EngineError, SearchQuery, TaskEngine, View, ViewKind};
pub use parser::Parser;
