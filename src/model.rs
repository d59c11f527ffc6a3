//! Task record model.
//!
//! A [`Task`] is created from a [`TaskDraft`] (the not-yet-persisted input
//! form) and then moves through the pending, completed and history lists.
//! Field names on the wire are fixed: `id, todo, isCompleted, dueDate,
//! priority, category, subtasks, files, createdAt, completedAt`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::Error;

/// Minimum trimmed length of a task's text.
pub const MIN_TEXT_LEN: usize = 3;

/// Maximum number of subtasks a draft accepts.
pub const MAX_SUBTASKS: usize = 5;

pub const DEFAULT_CATEGORY: &str = "General";

/// Categories offered by the input form. Category itself is free-form.
pub const SUGGESTED_CATEGORIES: [&str; 4] = ["General", "Work", "Study", "Personal"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    /// Fixed rank used for ordering: low < medium < high.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(Error::InvalidArgument(format!(
                "invalid priority '{}': must be low, medium, or high",
                s
            ))),
        }
    }
}

/// A checklist item embedded in a task. `is_completed` is carried as data;
/// no lifecycle operation changes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub text: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl Subtask {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_completed: false,
        }
    }
}

/// A file attached to a task.
///
/// `url` is a session-local handle to the file contents. It is persisted with
/// the task but only resolves inside the session that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub is_image: bool,
    #[serde(default)]
    pub ext: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, url: impl Into<String>, is_image: bool) -> Self {
        let name = name.into();
        let ext = file_extension(&name);
        Self {
            name,
            url: url.into(),
            is_image,
            ext,
        }
    }
}

/// Lowercased text after the last `.`, or empty when the name has none.
pub fn file_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(rename = "todo")]
    pub text: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_due_date",
        serialize_with = "serialize_due_date"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(rename = "files", default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Build a pending task from a draft.
    ///
    /// Returns `None` when the draft text is shorter than [`MIN_TEXT_LEN`]
    /// after trimming; the caller must not proceed in that case.
    pub fn from_draft(draft: &TaskDraft, id: String, created_at: DateTime<Utc>) -> Option<Self> {
        if !draft.is_valid() {
            return None;
        }
        Some(Self {
            id,
            text: draft.text.trim().to_string(),
            is_completed: false,
            due_date: draft.due_date,
            priority: draft.priority,
            category: draft.category.clone(),
            subtasks: draft.subtasks.clone(),
            attachments: draft.attachments.clone(),
            created_at,
            completed_at: None,
        })
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// A missing due date is written as `""`.
fn serialize_due_date<S>(date: &Option<NaiveDate>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
        None => serializer.serialize_str(""),
    }
}

/// Stored due dates may be absent, `null`, or an empty string.
fn deserialize_due_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Input form state used to create a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            text: String::new(),
            due_date: None,
            priority: Priority::Low,
            category: default_category(),
            subtasks: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

impl TaskDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Field values of an existing task, as used to repopulate the form.
    pub fn from_task(task: &Task) -> Self {
        let category = if task.category.trim().is_empty() {
            default_category()
        } else {
            task.category.clone()
        };
        Self {
            text: task.text.clone(),
            due_date: task.due_date,
            priority: task.priority,
            category,
            subtasks: task.subtasks.clone(),
            attachments: task.attachments.clone(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.text.trim().chars().count() >= MIN_TEXT_LEN
    }

    pub fn can_add_subtask(&self, text: &str) -> bool {
        !text.trim().is_empty() && self.subtasks.len() < MAX_SUBTASKS
    }

    /// Append a subtask. Rejected (returns `false`) when the text is blank or
    /// the draft already holds [`MAX_SUBTASKS`].
    pub fn add_subtask(&mut self, text: &str) -> bool {
        if !self.can_add_subtask(text) {
            return false;
        }
        self.subtasks.push(Subtask::new(text.trim()));
        true
    }

    pub fn remove_subtask(&mut self, index: usize) -> bool {
        if index >= self.subtasks.len() {
            return false;
        }
        self.subtasks.remove(index);
        true
    }

    pub fn stage_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Remove every staged attachment with `name`. Returns how many went.
    pub fn unstage_attachment(&mut self, name: &str) -> usize {
        let before = self.attachments.len();
        self.attachments.retain(|file| file.name != name);
        before - self.attachments.len()
    }

    /// Back to an empty form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Source of collision-resistant task ids.
pub trait IdGenerator {
    fn next_id(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn from_draft_trims_and_applies_defaults() {
        let draft = TaskDraft::new("  Buy milk  ");
        let task = Task::from_draft(&draft, "a".to_string(), created()).unwrap();
        assert_eq!(task.text, "Buy milk");
        assert!(!task.is_completed);
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.category, "General");
        assert!(task.due_date.is_none());
        assert!(task.completed_at.is_none());
        assert_eq!(task.created_at, created());
    }

    #[test]
    fn from_draft_rejects_short_text() {
        for text in ["", "  ", "ab", "  ab  "] {
            assert!(Task::from_draft(&TaskDraft::new(text), "x".into(), created()).is_none());
        }
        assert!(Task::from_draft(&TaskDraft::new(" abc "), "x".into(), created()).is_some());
    }

    #[test]
    fn subtask_limit_is_enforced() {
        let mut draft = TaskDraft::new("Plan trip");
        for idx in 0..MAX_SUBTASKS {
            assert!(draft.add_subtask(&format!("step {idx}")));
        }
        assert!(!draft.add_subtask("one too many"));
        assert_eq!(draft.subtasks.len(), MAX_SUBTASKS);
        assert!(!draft.add_subtask("   "));
    }

    #[test]
    fn blank_subtask_rejected() {
        let mut draft = TaskDraft::default();
        assert!(!draft.add_subtask(" "));
        assert!(draft.add_subtask(" pack "));
        assert_eq!(draft.subtasks[0], Subtask::new("pack"));
        assert!(!draft.remove_subtask(3));
        assert!(draft.remove_subtask(0));
        assert!(draft.subtasks.is_empty());
    }

    #[test]
    fn unstage_removes_all_with_name() {
        let mut draft = TaskDraft::default();
        draft.stage_attachment(Attachment::new("a.png", "blob:1", true));
        draft.stage_attachment(Attachment::new("b.pdf", "blob:2", false));
        draft.stage_attachment(Attachment::new("a.png", "blob:3", true));
        assert_eq!(draft.unstage_attachment("a.png"), 2);
        assert_eq!(draft.attachments.len(), 1);
        assert_eq!(draft.unstage_attachment("missing"), 0);
    }

    #[test]
    fn attachment_extension_is_lowercased() {
        assert_eq!(Attachment::new("Report.PDF", "blob:x", false).ext, "pdf");
        assert_eq!(Attachment::new("archive.tar.GZ", "blob:x", false).ext, "gz");
        assert_eq!(Attachment::new("README", "blob:x", false).ext, "");
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let mut draft = TaskDraft::new("Write report");
        draft.due_date = NaiveDate::from_ymd_opt(2024, 2, 3);
        draft.add_subtask("outline");
        draft.stage_attachment(Attachment::new("notes.pdf", "blob:1", false));
        let task = Task::from_draft(&draft, "id-1".into(), created()).unwrap();

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["id"], "id-1");
        assert_eq!(value["todo"], "Write report");
        assert_eq!(value["isCompleted"], false);
        assert_eq!(value["dueDate"], "2024-02-03");
        assert_eq!(value["priority"], "low");
        assert_eq!(value["category"], "General");
        assert_eq!(value["subtasks"][0]["isCompleted"], false);
        assert_eq!(value["files"][0]["isImage"], false);
        assert_eq!(value["files"][0]["ext"], "pdf");
        assert!(value.get("completedAt").is_none());
    }

    #[test]
    fn accepts_browser_stored_records() {
        let raw = r#"{
            "id": "7c9e",
            "todo": "Call mom",
            "isCompleted": true,
            "dueDate": "",
            "priority": "high",
            "category": "Personal",
            "subtasks": [{"text": "find number", "isCompleted": false}],
            "files": [{"name": "pic.jpg", "url": "blob:http://localhost/abc", "isImage": true, "ext": "jpg"}],
            "createdAt": "2024-01-01T10:00:00.000Z",
            "completedAt": "2024-01-02T08:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.text, "Call mom");
        assert!(task.due_date.is_none());
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.attachments[0].ext, "jpg");
        assert_eq!(
            task.completed_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn due_date_is_always_written() {
        let mut task = Task::from_draft(&TaskDraft::new("No deadline"), "n".into(), created()).unwrap();
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["dueDate"], "");

        task.due_date = NaiveDate::from_ymd_opt(2024, 3, 9);
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["dueDate"], "2024-03-09");
        let back: Task = serde_json::from_value(value).unwrap();
        assert_eq!(back.due_date, task.due_date);
    }

    #[test]
    fn draft_from_task_restores_defaults() {
        let mut task = Task::from_draft(&TaskDraft::new("Read book"), "r".into(), created()).unwrap();
        task.category = String::new();
        let draft = TaskDraft::from_task(&task);
        assert_eq!(draft.text, "Read book");
        assert_eq!(draft.category, "General");
        assert_eq!(draft.priority, Priority::Low);
    }

    #[test]
    fn priority_parse_and_rank() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
        assert!(Priority::Low.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::High.rank());
    }

    #[test]
    fn uuid_ids_are_distinct() {
        let ids = UuidGenerator;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(ids.next_id()));
        }
    }
}
