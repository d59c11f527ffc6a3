//! Plain-text rendering of a task for copying or sending elsewhere.

use crate::model::Task;

pub fn share_text(task: &Task) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Todo: {}", task.text));
    if !task.subtasks.is_empty() {
        lines.push("Subtasks:".to_string());
        for (idx, subtask) in task.subtasks.iter().enumerate() {
            lines.push(format!("  {}. {}", idx + 1, subtask.text));
        }
    }
    lines.push(format!("Priority: {}", task.priority));
    let due = task
        .due_date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "—".to_string());
    lines.push(format!("Due Date: {due}"));
    if !task.category.is_empty() {
        lines.push(format!("Category: {}", task.category));
    }
    lines.join("\n")
}
