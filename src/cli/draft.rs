//! tt draft commands: the input form that `tt add` turns into a task.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Attachment, TaskDraft, MAX_SUBTASKS, SUGGESTED_CATEGORIES};
use crate::output::{emit_success, HumanOutput};

use super::GlobalArgs;

/// Options for `tt draft attach`
pub struct AttachOptions {
    pub path: PathBuf,
    pub image: bool,
    pub global: GlobalArgs,
}

#[derive(Serialize)]
struct AttachReport<'a> {
    attachment: &'a Attachment,
    path: PathBuf,
    draft: &'a TaskDraft,
}

fn draft_output(header: String, draft: &TaskDraft) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("text", draft.text.clone());
    human.push_summary("priority", draft.priority.to_string());
    human.push_summary("category", draft.category.clone());
    human.push_summary(
        "due",
        draft
            .due_date
            .map(|due| due.to_string())
            .unwrap_or_else(|| "-".to_string()),
    );
    for (index, subtask) in draft.subtasks.iter().enumerate() {
        human.push_detail(format!("subtask {index}: {}", subtask.text));
    }
    for file in &draft.attachments {
        human.push_detail(format!("file: {} ({})", file.name, file.url));
    }
    human
}

pub fn run_show(global: GlobalArgs) -> Result<()> {
    let config = global.config()?;
    let session = global.session(&config);
    let draft = session.draft();

    let mut human = draft_output("tt draft".to_string(), draft);
    if !SUGGESTED_CATEGORIES.contains(&draft.category.as_str()) {
        human.push_warning(format!(
            "custom category (suggested: {})",
            SUGGESTED_CATEGORIES.join(", ")
        ));
    }
    if draft.is_valid() {
        human.push_next_step("tt add");
    }

    emit_success(global.output(), "draft show", draft, Some(&human))
}

pub fn run_clear(global: GlobalArgs) -> Result<()> {
    let config = global.config()?;
    let mut session = global.session(&config);
    session.update_draft(TaskDraft::reset)?;

    let human = HumanOutput::new("tt draft clear");
    emit_success(global.output(), "draft clear", session.draft(), Some(&human))
}

pub fn run_subtask(text: String, global: GlobalArgs) -> Result<()> {
    let config = global.config()?;
    let mut session = global.session(&config);

    if !session.update_draft(|draft| draft.add_subtask(&text))? {
        return Err(Error::Rejected(format!(
            "subtask must be non-empty and the draft holds at most {MAX_SUBTASKS}"
        )));
    }

    let human = draft_output(
        format!("tt draft subtask: {}", text.trim()),
        session.draft(),
    );
    emit_success(global.output(), "draft subtask", session.draft(), Some(&human))
}

pub fn run_unsubtask(index: usize, global: GlobalArgs) -> Result<()> {
    let config = global.config()?;
    let mut session = global.session(&config);

    let count = session.draft().subtasks.len();
    if !session.update_draft(|draft| draft.remove_subtask(index))? {
        return Err(Error::InvalidArgument(format!(
            "no subtask at index {index} (draft has {count})"
        )));
    }

    let human = draft_output(format!("tt draft unsubtask: {index}"), session.draft());
    emit_success(global.output(), "draft unsubtask", session.draft(), Some(&human))
}

pub fn run_attach(options: AttachOptions) -> Result<()> {
    let config = options.global.config()?;
    let mut session = options.global.session(&config);

    let attachment = session.attach(&options.path, options.image)?;
    let path = session
        .resolve_attachment(&attachment.url)
        .map(|path| path.to_path_buf())
        .unwrap_or_else(|| options.path.clone());

    let mut human = draft_output(
        format!("tt draft attach: {}", attachment.name),
        session.draft(),
    );
    human.push_warning("the file handle is only valid for this invocation");

    let report = AttachReport {
        attachment: &attachment,
        path,
        draft: session.draft(),
    };
    emit_success(options.global.output(), "draft attach", &report, Some(&human))
}

pub fn run_detach(name: String, global: GlobalArgs) -> Result<()> {
    let config = global.config()?;
    let mut session = global.session(&config);

    let removed = session.update_draft(|draft| draft.unstage_attachment(&name))?;
    if removed == 0 {
        return Err(Error::InvalidArgument(format!(
            "no staged attachment named '{name}'"
        )));
    }

    let human = draft_output(format!("tt draft detach: {name}"), session.draft());
    emit_success(global.output(), "draft detach", session.draft(), Some(&human))
}
