//! The active session: one identity, its three lists and its input form.
//!
//! A session is the caller the lifecycle functions expect. Each mutating
//! operation computes the new snapshots with [`crate::lifecycle`], installs
//! them in memory and saves every slot it touched before returning.
//!
//! Slots are saved destination first: a moved task is written to the list it
//! enters before it is removed from the list it leaves, so an interrupted
//! move can leave a duplicate but never loses the task. Saving stops at the
//! first failure. The new in-memory state stays authoritative, the unsaved
//! slots stay queued in order and the error is reported; [`Session::flush`]
//! retries them.
//!
//! Switching identity flushes first and refuses to switch when that fails, so
//! a pending save can never land in another identity's partition.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::lifecycle;
use crate::model::{Attachment, Clock, IdGenerator, SystemClock, Task, TaskDraft, UuidGenerator};
use crate::progress::{self, ProgressReport};
use crate::query::{self, FilterMode};
use crate::storage::{self, slot_key, Identity, KeyValueStore, ListName, DRAFT_SLOT};

/// A persisted piece of session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    List(ListName),
    Draft,
}

pub struct Session<S: KeyValueStore> {
    store: S,
    identity: Identity,
    pending: Vec<Task>,
    completed: Vec<Task>,
    history: Vec<Task>,
    draft: TaskDraft,
    /// Slots whose latest state is not saved yet, in the order they must be
    /// written.
    unsaved: Vec<Slot>,
    /// Attachment handles registered by this session, mapped to their files.
    handles: HashMap<String, PathBuf>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
}

impl<S: KeyValueStore> Session<S> {
    /// Open the session for `identity`, loading its lists and draft.
    pub fn open(store: S, identity: Identity) -> Self {
        let mut session = Self {
            store,
            identity,
            pending: Vec::new(),
            completed: Vec::new(),
            history: Vec::new(),
            draft: TaskDraft::default(),
            unsaved: Vec::new(),
            handles: HashMap::new(),
            clock: Box::new(SystemClock),
            ids: Box::new(UuidGenerator),
        };
        session.reload();
        session
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn pending(&self) -> &[Task] {
        &self.pending
    }

    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    pub fn history(&self) -> &[Task] {
        &self.history
    }

    pub fn list(&self, name: ListName) -> &[Task] {
        match name {
            ListName::Todos => &self.pending,
            ListName::Completed => &self.completed,
            ListName::History => &self.history,
        }
    }

    /// Which list currently holds `id`, if any.
    pub fn locate(&self, id: &str) -> Option<ListName> {
        ListName::ALL
            .into_iter()
            .find(|name| lifecycle::contains(self.list(*name), id))
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    /// Lists whose latest state has not been saved, in save order.
    pub fn dirty_lists(&self) -> Vec<ListName> {
        self.unsaved
            .iter()
            .filter_map(|slot| match slot {
                Slot::List(list) => Some(*list),
                Slot::Draft => None,
            })
            .collect()
    }

    /// Every unsaved slot, in save order.
    pub fn unsaved(&self) -> &[Slot] {
        &self.unsaved
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create a pending task from the current draft.
    ///
    /// Returns `Ok(None)` and changes nothing when the draft is rejected.
    /// Otherwise the draft is reset to an empty form.
    pub fn add(&mut self) -> Result<Option<Task>> {
        if !self.draft.is_valid() {
            tracing::debug!(text = %self.draft.text, "draft rejected");
            return Ok(None);
        }

        let next = lifecycle::add(&self.pending, &self.draft, self.clock.as_ref(), self.ids.as_ref());
        let added = next.last().cloned();
        self.install(vec![(ListName::Todos, next)]);
        self.draft.reset();
        self.mark(Slot::Draft);
        self.flush()?;
        Ok(added)
    }

    /// Remove a pending task and load its fields into the draft.
    ///
    /// The task is gone from the pending list as soon as this returns; it
    /// only comes back if the draft is added again.
    pub fn edit(&mut self, id: &str) -> Result<Option<TaskDraft>> {
        let (next, fields) = lifecycle::edit(&self.pending, id);
        let Some(fields) = fields else {
            return Ok(None);
        };
        self.draft = fields.clone();
        self.mark(Slot::Draft);
        self.install(vec![(ListName::Todos, next)]);
        self.flush()?;
        Ok(Some(fields))
    }

    /// Permanently delete `id` from `list`. `Ok(false)` when it was not there.
    pub fn delete(&mut self, list: ListName, id: &str) -> Result<bool> {
        let current = self.list(list);
        if !lifecycle::contains(current, id) {
            return Ok(false);
        }
        let next = match list {
            ListName::Todos => lifecycle::delete_pending(current, id),
            ListName::Completed => lifecycle::delete_completed(current, id),
            ListName::History => lifecycle::delete_history(current, id),
        };
        self.install(vec![(list, next)]);
        self.flush()?;
        Ok(true)
    }

    /// Pending -> completed.
    pub fn complete(&mut self, id: &str) -> Result<bool> {
        if !lifecycle::contains(&self.pending, id) {
            return Ok(false);
        }
        let (pending, completed) =
            lifecycle::complete(&self.pending, &self.completed, id, self.clock.now());
        self.install(vec![(ListName::Completed, completed), (ListName::Todos, pending)]);
        self.flush()?;
        Ok(true)
    }

    /// Completed -> history.
    pub fn archive(&mut self, id: &str) -> Result<bool> {
        if !lifecycle::contains(&self.completed, id) {
            return Ok(false);
        }
        let (completed, history) = lifecycle::archive(&self.completed, &self.history, id);
        self.install(vec![(ListName::History, history), (ListName::Completed, completed)]);
        self.flush()?;
        Ok(true)
    }

    /// Move the pending task at `from` to `to`. `Ok(false)` when either index
    /// is out of range.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<bool> {
        if !lifecycle::reorder_in_range(&self.pending, from, to) {
            return Ok(false);
        }
        let next = lifecycle::reorder(&self.pending, from, to);
        self.install(vec![(ListName::Todos, next)]);
        self.flush()?;
        Ok(true)
    }

    // =========================================================================
    // Draft
    // =========================================================================

    /// Apply `f` to the draft and persist the result.
    pub fn update_draft<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut TaskDraft) -> T,
    {
        let result = f(&mut self.draft);
        self.mark(Slot::Draft);
        self.flush()?;
        Ok(result)
    }

    /// Register `path` under a fresh session-local handle and stage it on the
    /// draft.
    pub fn attach(&mut self, path: &Path, is_image: bool) -> Result<Attachment> {
        if !path.is_file() {
            return Err(Error::InvalidArgument(format!(
                "not a file: {}",
                path.display()
            )));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidArgument(format!("no file name: {}", path.display())))?;

        let url = format!("blob:{}", self.ids.next_id());
        self.handles.insert(url.clone(), path.to_path_buf());
        let attachment = Attachment::new(name, url, is_image);
        let staged = attachment.clone();
        self.update_draft(move |draft| draft.stage_attachment(staged))?;
        Ok(attachment)
    }

    /// File behind an attachment handle. Only handles registered by this
    /// session resolve; handles loaded from storage do not.
    pub fn resolve_attachment(&self, url: &str) -> Option<&Path> {
        self.handles.get(url).map(PathBuf::as_path)
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn visible_pending(&self, mode: FilterMode) -> Vec<Task> {
        query::filter_pending(&self.pending, mode)
    }

    /// History filtered by completion date (UTC) and then sorted by `sort_key`.
    pub fn history_view(&self, ymd: Option<&str>, sort_key: &str) -> Vec<Task> {
        let filtered = query::filter_history_by_date(&self.history, ymd);
        query::sort_history(&filtered, sort_key)
    }

    pub fn progress(&self) -> ProgressReport {
        ProgressReport::from_lists(&self.pending, &self.completed, &self.history)
    }

    pub fn chart(&self) -> Vec<progress::ChartPoint> {
        progress::chart_series(&self.pending)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Save unsaved slots in order, stopping at the first failure.
    pub fn flush(&mut self) -> Result<()> {
        while let Some(&slot) = self.unsaved.first() {
            match slot {
                Slot::List(list) => self.persist(list)?,
                Slot::Draft => self.persist_draft()?,
            }
            self.unsaved.remove(0);
        }
        Ok(())
    }

    /// Make `identity` the active one and load its partition.
    ///
    /// Unsaved state of the current identity is flushed first; if that fails
    /// the session stays on the current identity.
    pub fn switch_identity(&mut self, identity: Identity) -> Result<()> {
        if identity == self.identity {
            return Ok(());
        }
        self.flush()?;
        tracing::debug!(from = %self.identity, to = %identity, "switching identity");
        self.identity = identity;
        self.reload();
        Ok(())
    }

    fn reload(&mut self) {
        self.pending = storage::load(&self.store, ListName::Todos, &self.identity);
        self.completed = storage::load(&self.store, ListName::Completed, &self.identity);
        self.history = storage::load(&self.store, ListName::History, &self.identity);
        self.draft = storage::load_json(&self.store, &slot_key(DRAFT_SLOT, &self.identity))
            .unwrap_or_default();
        self.unsaved.clear();
    }

    /// Queue `slot` behind everything already queued. A slot left over from
    /// an earlier failure moves back so the current operation's order holds.
    fn mark(&mut self, slot: Slot) {
        self.unsaved.retain(|queued| *queued != slot);
        self.unsaved.push(slot);
    }

    /// Put new snapshots in memory and queue them for saving, in the order
    /// given.
    fn install(&mut self, updates: Vec<(ListName, Vec<Task>)>) {
        for (list, tasks) in updates {
            match list {
                ListName::Todos => self.pending = tasks,
                ListName::Completed => self.completed = tasks,
                ListName::History => self.history = tasks,
            }
            self.mark(Slot::List(list));
        }
    }

    fn persist(&mut self, list: ListName) -> Result<()> {
        let tasks = match list {
            ListName::Todos => &self.pending,
            ListName::Completed => &self.completed,
            ListName::History => &self.history,
        };
        storage::save(&mut self.store, list, &self.identity, tasks).map_err(|err| {
            tracing::warn!(list = %list, identity = %self.identity, error = %err, "save failed, keeping in-memory state");
            err
        })
    }

    fn persist_draft(&mut self) -> Result<()> {
        let key = slot_key(DRAFT_SLOT, &self.identity);
        storage::save_json(&mut self.store, &key, &self.draft).map_err(|err| {
            tracing::warn!(key = %key, error = %err, "draft save failed");
            err
        })
    }
}
