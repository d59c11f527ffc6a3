//! Storage layer for tt
//!
//! Every list is one JSON array stored in a key-value slot. The slot key is
//! `{list}` for the anonymous session and `{list}_{identity}` for a signed-in
//! identity, where `{list}` is one of `todos`, `completed`, `history`.
//!
//! # On-disk layout ([`FileStore`])
//!
//! ```text
//! <data_dir>/
//!   todos.json                  # anonymous pending list
//!   completed_u1.json           # completed list of identity "u1"
//!   completed_u1.json.lock      # lock guarding writes to that slot
//!   draft_u1.json               # input form of identity "u1"
//!   active_user.json            # signed-in identity, if any
//! ```
//!
//! Reads fail open: a missing slot or one holding malformed JSON loads as an
//! empty list. Writes overwrite the slot completely.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};
use crate::model::Task;

/// Slot holding the input form (not one of the three lists).
pub const DRAFT_SLOT: &str = "draft";

/// The three task lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListName {
    /// Pending tasks, persisted under `todos`.
    Todos,
    Completed,
    History,
}

impl ListName {
    pub const ALL: [ListName; 3] = [ListName::Todos, ListName::Completed, ListName::History];

    pub fn as_str(self) -> &'static str {
        match self {
            ListName::Todos => "todos",
            ListName::Completed => "completed",
            ListName::History => "history",
        }
    }
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListName {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todos" | "pending" => Ok(ListName::Todos),
            "completed" => Ok(ListName::Completed),
            "history" => Ok(ListName::History),
            _ => Err(Error::InvalidArgument(format!(
                "invalid list '{}': must be pending, completed, or history",
                s
            ))),
        }
    }
}

/// Who the active session belongs to. Selects the storage partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    User(String),
}

impl Identity {
    /// `None` or a blank id means anonymous.
    pub fn from_option(id: Option<&str>) -> Self {
        match id.map(str::trim) {
            Some(id) if !id.is_empty() => Identity::User(id.to_string()),
            _ => Identity::Anonymous,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Identity::Anonymous => None,
            Identity::User(id) => Some(id),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Anonymous => f.write_str("anonymous"),
            Identity::User(id) => f.write_str(id),
        }
    }
}

/// Key of the slot holding `name` for `identity`.
pub fn slot_key(name: &str, identity: &Identity) -> String {
    match identity {
        Identity::Anonymous => name.to_string(),
        Identity::User(id) => format!("{name}_{id}"),
    }
}

/// Minimal durable key-value contract the core depends on.
pub trait KeyValueStore {
    /// Raw value stored under `key`, or `None` when nothing was saved.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One JSON file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for_key(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for_key(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for_key(key);
        lock::write_atomic_locked(&path, value.as_bytes(), self.lock_timeout_ms)
    }
}

/// In-process store; contents vanish with the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.items.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load a list. Never fails: missing, unreadable or malformed slots load empty.
pub fn load<S: KeyValueStore + ?Sized>(store: &S, list: ListName, identity: &Identity) -> Vec<Task> {
    let key = slot_key(list.as_str(), identity);
    let tasks: Vec<Task> = load_json(store, &key).unwrap_or_default();
    tracing::debug!(key = %key, count = tasks.len(), "loaded list");
    tasks
}

/// Save a list, overwriting whatever the slot held.
pub fn save<S: KeyValueStore + ?Sized>(
    store: &mut S,
    list: ListName,
    identity: &Identity,
    tasks: &[Task],
) -> Result<()> {
    let key = slot_key(list.as_str(), identity);
    save_json(store, &key, &tasks)?;
    tracing::debug!(key = %key, count = tasks.len(), "saved list");
    Ok(())
}

/// Deserialize the value under `key`; `None` when absent or unparsable.
pub fn load_json<S, T>(store: &S, key: &str) -> Option<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let raw = match store.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(key = %key, error = %err, "slot unreadable, treating as empty");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key = %key, error = %err, "slot holds invalid JSON, treating as empty");
            None
        }
    }
}

pub fn save_json<S, T>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.set_item(key, &json).map_err(|err| match err {
        Error::LockFailed(path) => Error::LockFailed(path),
        other => Error::SaveFailed {
            key: key.to_string(),
            reason: other.to_string(),
        },
    })
}

/// Map a key to a file name. Alphanumerics, `-` and `_` pass through, every
/// other byte becomes `%XX`, so distinct keys get distinct names.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    if encoded.is_empty() {
        "%".to_string()
    } else {
        encoded
    }
}
