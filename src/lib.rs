//! todopad - a local to-do list
//!
//! This library provides the core functionality for the todopad CLI: an
//! ordered list of tasks that is written back to a key-value store as a whole
//! after every change.
//!
//! # Core Concepts
//!
//! - **Tasks**: text, a category, a priority, a due date and a done flag
//! - **Store**: the in-memory list, replaced only after the write succeeds
//! - **Key-value backend**: one key holds the whole encoded list
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `todopad.toml`
//! - `error`: Error types and result aliases
//! - `kv`: Key-value storage trait with memory and file backends
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON output for commands
//! - `store`: The task list and its mutations
//! - `task`: Task types, id generation and the stored encoding
//! - `ui`: Interactive terminal list

pub mod cli;
pub mod config;
pub mod error;
pub mod kv;
pub mod lock;
pub mod output;
pub mod store;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
