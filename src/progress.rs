//! Progress derived from the three lists.

use serde::Serialize;

use crate::model::Task;

/// Percentage of tasks that are done, in `[0, 100]`.
///
/// Completed and history both count as done, so archiving never changes the
/// result. With no tasks at all the result is 0.
pub fn progress(pending: &[Task], completed: &[Task], history: &[Task]) -> f64 {
    let done = completed.len() + history.len();
    let total = pending.len() + done;
    if total == 0 {
        return 0.0;
    }
    100.0 * done as f64 / total as f64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub pending: usize,
    pub completed: usize,
    pub history: usize,
    pub percent: f64,
}

impl ProgressReport {
    pub fn from_lists(pending: &[Task], completed: &[Task], history: &[Task]) -> Self {
        Self {
            pending: pending.len(),
            completed: completed.len(),
            history: history.len(),
            percent: progress(pending, completed, history),
        }
    }
}

/// One point of the pending-tasks chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub status: u8,
}

/// Chart series over the pending list: 1 for completed-flagged tasks, else 0.
pub fn chart_series(pending: &[Task]) -> Vec<ChartPoint> {
    pending
        .iter()
        .map(|task| ChartPoint {
            name: task.text.clone(),
            status: u8::from(task.is_completed),
        })
        .collect()
}
