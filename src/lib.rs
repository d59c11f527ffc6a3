//! tt - Task Tracker Library
//!
//! This library provides the core functionality for the tt CLI tool: a
//! personal task tracker whose tasks move from pending to completed to
//! history, persisted per user in a small key-value store.
//!
//! # Core Concepts
//!
//! - **Lists**: `todos` (pending), `completed` and `history`; a task lives in
//!   at most one of them
//! - **Draft**: the input form a new task is created from
//! - **Identity**: anonymous or a user id; selects the storage partition
//! - **Progress**: share of tasks that are done, across all three lists
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types and result aliases
//! - `identity`: Active user resolution and sign-in
//! - `lifecycle`: Pure list transitions (add, edit, complete, archive, ...)
//! - `lock`: File locking and atomic writes
//! - `model`: Task, draft and attachment records
//! - `output`: Human and JSON output
//! - `progress`: Progress percentage and chart series
//! - `query`: Pending filter, history date filter and sort
//! - `session`: Active identity with its loaded lists
//! - `share`: Plain-text rendering for sharing a task
//! - `storage`: Key-value slots and list persistence

pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod lock;
pub mod model;
pub mod output;
pub mod progress;
pub mod query;
pub mod session;
pub mod share;
pub mod storage;

pub use error::{Error, Result};
