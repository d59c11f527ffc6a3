//! tt task commands: add, edit, done, archive, rm, mv, share.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Priority, Task, TaskDraft};
use crate::output::{emit_success, HumanOutput};
use crate::query;
use crate::share::share_text;
use crate::storage::ListName;

use super::GlobalArgs;

/// Options for `tt add`
pub struct AddOptions {
    pub text: Option<String>,
    pub due: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub subtasks: Vec<String>,
    pub global: GlobalArgs,
}

/// Options for commands addressing a single task
pub struct IdOptions {
    pub id: String,
    pub global: GlobalArgs,
}

/// Options for `tt rm`
pub struct RmOptions {
    pub id: String,
    pub from: String,
    pub global: GlobalArgs,
}

/// Options for `tt mv`
pub struct MvOptions {
    pub from: usize,
    pub to: usize,
    pub global: GlobalArgs,
}

#[derive(Serialize)]
struct MoveReport<'a> {
    id: &'a str,
    from: &'static str,
    to: &'static str,
}

#[derive(Serialize)]
struct RemoveReport<'a> {
    id: &'a str,
    list: &'static str,
}

#[derive(Serialize)]
struct ReorderReport<'a> {
    from: usize,
    to: usize,
    todos: &'a [Task],
}

#[derive(Serialize)]
struct ShareReport<'a> {
    id: &'a str,
    text: String,
}

/// User-facing name of a list.
pub(super) fn list_label(list: ListName) -> &'static str {
    match list {
        ListName::Todos => "pending",
        ListName::Completed => "completed",
        ListName::History => "history",
    }
}

/// Resolve a full id or a unique id prefix within `tasks`.
pub(super) fn resolve_id(tasks: &[Task], list: ListName, input: &str) -> Result<String> {
    let input = input.trim();
    let not_found = || Error::TaskNotFound {
        list: list_label(list).to_string(),
        id: input.to_string(),
    };
    if input.is_empty() {
        return Err(not_found());
    }
    if let Some(task) = tasks.iter().find(|task| task.id == input) {
        return Ok(task.id.clone());
    }

    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.id.starts_with(input))
        .collect();
    match matches.as_slice() {
        [] => Err(not_found()),
        [task] => Ok(task.id.clone()),
        _ => Err(Error::InvalidArgument(format!(
            "id prefix '{input}' matches {} tasks in {}",
            matches.len(),
            list_label(list)
        ))),
    }
}

pub(super) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// One-line rendering of a task for human output.
pub(super) fn task_line(task: &Task) -> String {
    let mut line = format!(
        "{} {} [{}] {}",
        short_id(&task.id),
        task.text,
        task.priority,
        task.category
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due {due}"));
    }
    if !task.subtasks.is_empty() {
        line.push_str(&format!(" ({} subtasks)", task.subtasks.len()));
    }
    if !task.attachments.is_empty() {
        line.push_str(&format!(" <{}>", query::attachment_kinds(task)));
    }
    line
}

pub(super) fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        Error::InvalidArgument(format!("invalid date '{input}': expected YYYY-MM-DD"))
    })
}

/// `draft` with `options` merged in. Fails on the first invalid flag; the
/// caller's draft is never touched.
fn merge_into_draft(draft: &TaskDraft, options: &AddOptions) -> Result<TaskDraft> {
    let mut next = draft.clone();
    if let Some(text) = &options.text {
        next.text = text.clone();
    }
    if let Some(due) = &options.due {
        next.due_date = if due.trim().is_empty() {
            None
        } else {
            Some(parse_date(due)?)
        };
    }
    if let Some(priority) = &options.priority {
        next.priority = priority.parse::<Priority>()?;
    }
    if let Some(category) = &options.category {
        next.category = category.trim().to_string();
    }
    for subtask in &options.subtasks {
        if !next.add_subtask(subtask) {
            return Err(Error::Rejected(format!(
                "subtask '{subtask}' rejected: must be non-empty and at most {} per task",
                crate::model::MAX_SUBTASKS
            )));
        }
    }
    Ok(next)
}

fn text_too_short() -> Error {
    Error::Rejected(format!(
        "task text must be at least {} characters",
        crate::model::MIN_TEXT_LEN
    ))
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let config = options.global.config()?;
    let mut session = options.global.session(&config);

    // Rejected input leaves the stored draft unchanged.
    let merged = merge_into_draft(session.draft(), &options)?;
    if !merged.is_valid() {
        return Err(text_too_short());
    }
    session.update_draft(|draft| *draft = merged)?;
    let task = session.add()?.ok_or_else(text_too_short)?;

    let mut human = HumanOutput::new(format!("tt add: {}", task.text));
    human.push_summary("id", task.id.clone());
    human.push_summary("priority", task.priority.to_string());
    human.push_summary("category", task.category.clone());
    if let Some(due) = task.due_date {
        human.push_summary("due", due.to_string());
    }
    if !task.subtasks.is_empty() {
        human.push_summary("subtasks", task.subtasks.len().to_string());
    }
    if !task.attachments.is_empty() {
        human.push_summary("files", task.attachments.len().to_string());
    }
    human.push_next_step(format!("tt done {}", short_id(&task.id)));

    emit_success(options.global.output(), "add", &task, Some(&human))
}

pub fn run_edit(options: IdOptions) -> Result<()> {
    let config = options.global.config()?;
    let mut session = options.global.session(&config);

    let id = resolve_id(session.pending(), ListName::Todos, &options.id)?;
    let Some(draft) = session.edit(&id)? else {
        return Err(Error::TaskNotFound {
            list: list_label(ListName::Todos).to_string(),
            id,
        });
    };

    let mut human = HumanOutput::new(format!("tt edit: {}", draft.text));
    human.push_summary("removed", id.clone());
    human.push_warning("the task is no longer pending until it is added again");
    human.push_next_step("tt draft show");
    human.push_next_step("tt add");

    emit_success(options.global.output(), "edit", &draft, Some(&human))
}

pub fn run_done(options: IdOptions) -> Result<()> {
    let config = options.global.config()?;
    let mut session = options.global.session(&config);

    let id = resolve_id(session.pending(), ListName::Todos, &options.id)?;
    session.complete(&id)?;

    let report = MoveReport {
        id: &id,
        from: list_label(ListName::Todos),
        to: list_label(ListName::Completed),
    };
    let mut human = HumanOutput::new(format!("tt done: {}", short_id(&id)));
    human.push_summary("progress", format!("{:.0}%", session.progress().percent));
    human.push_next_step(format!("tt archive {}", short_id(&id)));

    emit_success(options.global.output(), "done", &report, Some(&human))
}

pub fn run_archive(options: IdOptions) -> Result<()> {
    let config = options.global.config()?;
    let mut session = options.global.session(&config);

    let id = resolve_id(session.completed(), ListName::Completed, &options.id)?;
    session.archive(&id)?;

    let report = MoveReport {
        id: &id,
        from: list_label(ListName::Completed),
        to: list_label(ListName::History),
    };
    let mut human = HumanOutput::new(format!("tt archive: {}", short_id(&id)));
    human.push_next_step("tt history");

    emit_success(options.global.output(), "archive", &report, Some(&human))
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let list: ListName = options.from.parse()?;
    let config = options.global.config()?;
    let mut session = options.global.session(&config);

    let id = resolve_id(session.list(list), list, &options.id)?;
    session.delete(list, &id)?;

    let report = RemoveReport {
        id: &id,
        list: list_label(list),
    };
    let human = HumanOutput::new(format!("tt rm: {} from {}", short_id(&id), list_label(list)));

    emit_success(options.global.output(), "rm", &report, Some(&human))
}

pub fn run_mv(options: MvOptions) -> Result<()> {
    let config = options.global.config()?;
    let mut session = options.global.session(&config);

    if !session.reorder(options.from, options.to)? {
        return Err(Error::InvalidArgument(format!(
            "cannot move {} to {}: pending list has {} tasks",
            options.from,
            options.to,
            session.pending().len()
        )));
    }

    let report = ReorderReport {
        from: options.from,
        to: options.to,
        todos: session.pending(),
    };
    let mut human = HumanOutput::new(format!("tt mv: {} -> {}", options.from, options.to));
    for (index, task) in session.pending().iter().enumerate() {
        human.push_detail(format!("{index}. {}", task_line(task)));
    }

    emit_success(options.global.output(), "mv", &report, Some(&human))
}

pub fn run_share(options: IdOptions) -> Result<()> {
    let config = options.global.config()?;
    let session = options.global.session(&config);

    let mut found = None;
    for list in ListName::ALL {
        match resolve_id(session.list(list), list, &options.id) {
            Ok(id) => {
                found = Some((list, id));
                break;
            }
            Err(Error::TaskNotFound { .. }) => continue,
            Err(err) => return Err(err),
        }
    }
    let Some((list, id)) = found else {
        return Err(Error::TaskNotFound {
            list: "any list".to_string(),
            id: options.id.trim().to_string(),
        });
    };
    let task = session
        .list(list)
        .iter()
        .find(|task| task.id == id)
        .ok_or_else(|| Error::TaskNotFound {
            list: list_label(list).to_string(),
            id: id.clone(),
        })?;
    let text = share_text(task);

    if options.global.json {
        let report = ShareReport { id: &id, text };
        return emit_success(options.global.output(), "share", &report, None);
    }
    if !options.global.quiet {
        println!("{text}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn task(id: &str) -> Task {
        let draft = TaskDraft::new("some task");
        Task::from_draft(&draft, id.to_string(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .unwrap()
    }

    #[test]
    fn resolve_id_accepts_exact_and_unique_prefix() {
        let tasks = vec![task("abc123"), task("abd456")];
        assert_eq!(resolve_id(&tasks, ListName::Todos, "abc123").unwrap(), "abc123");
        assert_eq!(resolve_id(&tasks, ListName::Todos, "abd").unwrap(), "abd456");
        assert!(matches!(
            resolve_id(&tasks, ListName::Todos, "ab"),
            Err(Error::InvalidArgument(_))
        ));
        match resolve_id(&tasks, ListName::Completed, "zzz") {
            Err(Error::TaskNotFound { list, id }) => {
                assert_eq!(list, "completed");
                assert_eq!(id, "zzz");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn merge_applies_flags_atomically() {
        let options = AddOptions {
            text: Some("Write report".to_string()),
            due: Some("2024-05-01".to_string()),
            priority: Some("high".to_string()),
            category: Some("Work".to_string()),
            subtasks: vec!["outline".to_string()],
            global: GlobalArgs {
                data_dir: None,
                user: None,
                config: None,
                json: false,
                quiet: false,
            },
        };
        let merged = merge_into_draft(&TaskDraft::default(), &options).unwrap();
        assert_eq!(merged.text, "Write report");
        assert_eq!(merged.priority, Priority::High);
        assert_eq!(merged.due_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(merged.subtasks.len(), 1);

        let mut full = TaskDraft::default();
        for n in 0..crate::model::MAX_SUBTASKS {
            full.add_subtask(&format!("s{n}"));
        }
        assert!(matches!(
            merge_into_draft(&full, &options),
            Err(Error::Rejected(_))
        ));
    }

    #[test]
    fn bad_due_date_is_invalid_argument() {
        assert!(matches!(parse_date("05/01/2024"), Err(Error::InvalidArgument(_))));
        assert_eq!(parse_date(" 2024-02-29 ").unwrap().to_string(), "2024-02-29");
    }
}
