//! Read-only views over the lists: pending filter, history filter and sort.
//!
//! Calendar dates are taken in UTC. A history entry matches a date filter when
//! its `completedAt`, converted to UTC and truncated to a date, equals the
//! requested `YYYY-MM-DD`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Error;
use crate::model::Task;

/// Which pending tasks to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Only tasks with `isCompleted = false`.
    #[default]
    Pending,
    All,
}

impl FromStr for FilterMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(FilterMode::Pending),
            "all" => Ok(FilterMode::All),
            _ => Err(Error::InvalidArgument(format!(
                "invalid filter '{}': must be pending or all",
                s
            ))),
        }
    }
}

pub fn filter_pending(pending: &[Task], mode: FilterMode) -> Vec<Task> {
    match mode {
        FilterMode::Pending => pending
            .iter()
            .filter(|task| !task.is_completed)
            .cloned()
            .collect(),
        FilterMode::All => pending.to_vec(),
    }
}

/// Calendar date of an instant, in UTC.
pub fn utc_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// Keep history entries completed on `ymd` (UTC). An empty or absent filter
/// keeps everything; entries without `completedAt` never match a date.
pub fn filter_history_by_date(history: &[Task], ymd: Option<&str>) -> Vec<Task> {
    let ymd = match ymd.map(str::trim) {
        None | Some("") => return history.to_vec(),
        Some(ymd) => ymd,
    };

    history
        .iter()
        .filter(|task| {
            task.completed_at
                .map(|at| utc_date(at).format("%Y-%m-%d").to_string() == ymd)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HistorySort {
    #[serde(rename = "date-asc")]
    DateAsc,
    #[default]
    #[serde(rename = "date-desc")]
    DateDesc,
    #[serde(rename = "priority-asc")]
    PriorityAsc,
    #[serde(rename = "priority-desc")]
    PriorityDesc,
}

impl HistorySort {
    pub const ALL: [HistorySort; 4] = [
        HistorySort::DateAsc,
        HistorySort::DateDesc,
        HistorySort::PriorityAsc,
        HistorySort::PriorityDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HistorySort::DateAsc => "date-asc",
            HistorySort::DateDesc => "date-desc",
            HistorySort::PriorityAsc => "priority-asc",
            HistorySort::PriorityDesc => "priority-desc",
        }
    }

    /// `None` for keys this module does not know.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(key.trim()))
    }
}

impl fmt::Display for HistorySort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable sort of history by `key`. Unknown keys leave the order as is.
pub fn sort_history(history: &[Task], key: &str) -> Vec<Task> {
    match HistorySort::parse(key) {
        Some(sort) => sort_history_by(history, sort),
        None => history.to_vec(),
    }
}

pub fn sort_history_by(history: &[Task], sort: HistorySort) -> Vec<Task> {
    let mut sorted = history.to_vec();
    match sort {
        HistorySort::DateAsc => sorted.sort_by(|a, b| a.completed_at.cmp(&b.completed_at)),
        HistorySort::DateDesc => sorted.sort_by(|a, b| b.completed_at.cmp(&a.completed_at)),
        HistorySort::PriorityAsc => {
            sorted.sort_by(|a, b| a.priority.rank().cmp(&b.priority.rank()))
        }
        HistorySort::PriorityDesc => {
            sorted.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()))
        }
    }
    sorted
}

/// Kind label shown for a history entry: `Task` without attachments, else the
/// distinct attachment kinds (`Image`, `PDF`, `Document`) in first-seen order.
pub fn attachment_kinds(task: &Task) -> String {
    if task.attachments.is_empty() {
        return "Task".to_string();
    }

    let mut kinds: Vec<&str> = Vec::new();
    for file in &task.attachments {
        let kind = if file.is_image {
            "Image"
        } else if file.ext == "pdf" {
            "PDF"
        } else {
            "Document"
        };
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    kinds.join(", ")
}
