//! Task lifecycle: pending -> completed -> history, plus permanent deletion.
//!
//! Every function here is pure. It takes the current list snapshots and
//! returns new ones; persisting them is the caller's job (see
//! [`crate::session::Session`]). A transition naming an id that is not in its
//! source list returns the inputs unchanged. There are no backward moves.

use chrono::{DateTime, Utc};

use crate::model::{Clock, IdGenerator, Task, TaskDraft};

fn position(list: &[Task], id: &str) -> Option<usize> {
    list.iter().position(|task| task.id == id)
}

/// Whether `id` is in `list`.
pub fn contains(list: &[Task], id: &str) -> bool {
    position(list, id).is_some()
}

/// Append a new pending task built from `draft`.
///
/// A draft whose trimmed text is shorter than three characters is rejected
/// and the list comes back unchanged.
pub fn add(
    pending: &[Task],
    draft: &TaskDraft,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
) -> Vec<Task> {
    let mut next = pending.to_vec();
    if let Some(task) = Task::from_draft(draft, ids.next_id(), clock.now()) {
        next.push(task);
    }
    next
}

/// Start editing a pending task.
///
/// The task is removed from the list and its field values are returned for
/// the input form. Abandoning the edit loses the task.
pub fn edit(pending: &[Task], id: &str) -> (Vec<Task>, Option<TaskDraft>) {
    let mut next = pending.to_vec();
    match position(&next, id) {
        Some(idx) => {
            let task = next.remove(idx);
            (next, Some(TaskDraft::from_task(&task)))
        }
        None => (next, None),
    }
}

fn delete(list: &[Task], id: &str) -> Vec<Task> {
    list.iter().filter(|task| task.id != id).cloned().collect()
}

pub fn delete_pending(pending: &[Task], id: &str) -> Vec<Task> {
    delete(pending, id)
}

pub fn delete_completed(completed: &[Task], id: &str) -> Vec<Task> {
    delete(completed, id)
}

pub fn delete_history(history: &[Task], id: &str) -> Vec<Task> {
    delete(history, id)
}

/// Mark a pending task done and put it at the head of completed.
///
/// Returns `(pending, completed)`.
pub fn complete(
    pending: &[Task],
    completed: &[Task],
    id: &str,
    now: DateTime<Utc>,
) -> (Vec<Task>, Vec<Task>) {
    let mut next_pending = pending.to_vec();
    let Some(idx) = position(&next_pending, id) else {
        return (next_pending, completed.to_vec());
    };

    let mut task = next_pending.remove(idx);
    task.is_completed = true;
    task.completed_at = Some(now);

    let mut next_completed = Vec::with_capacity(completed.len() + 1);
    next_completed.push(task);
    next_completed.extend_from_slice(completed);
    (next_pending, next_completed)
}

/// Move a completed task to the head of history, unchanged.
///
/// Returns `(completed, history)`.
pub fn archive(completed: &[Task], history: &[Task], id: &str) -> (Vec<Task>, Vec<Task>) {
    let mut next_completed = completed.to_vec();
    let Some(idx) = position(&next_completed, id) else {
        return (next_completed, history.to_vec());
    };

    let task = next_completed.remove(idx);
    let mut next_history = Vec::with_capacity(history.len() + 1);
    next_history.push(task);
    next_history.extend_from_slice(history);
    (next_completed, next_history)
}

/// Move the pending task at `from` so it ends up at `to`.
///
/// Both indices must be `< pending.len()`. Out-of-range requests are
/// rejected: the list comes back unchanged.
pub fn reorder(pending: &[Task], from: usize, to: usize) -> Vec<Task> {
    let mut next = pending.to_vec();
    if !reorder_in_range(pending, from, to) {
        tracing::debug!(from, to, len = pending.len(), "reorder out of range, ignored");
        return next;
    }
    let moved = next.remove(from);
    next.insert(to, moved);
    next
}

pub fn reorder_in_range(pending: &[Task], from: usize, to: usize) -> bool {
    from < pending.len() && to < pending.len()
}
