//! tt view commands: list, completed, history, progress, chart.

use serde::Serialize;

use crate::error::Result;
use crate::model::Task;
use crate::output::{emit_success, HumanOutput};
use crate::query::{self, FilterMode, HistorySort};

use super::task::{parse_date, short_id, task_line};
use super::GlobalArgs;

/// Options for `tt list`
pub struct ListOptions {
    pub filter: Option<String>,
    pub global: GlobalArgs,
}

/// Options for `tt history`
pub struct HistoryOptions {
    pub date: Option<String>,
    pub sort: Option<String>,
    pub global: GlobalArgs,
}

#[derive(Serialize)]
struct ListReport {
    filter: FilterMode,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct HistoryReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    sort: String,
    tasks: Vec<Task>,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let config = options.global.config()?;
    let mode = match options.filter.as_deref() {
        Some(filter) => filter.parse::<FilterMode>()?,
        None => config.view.pending_filter,
    };
    let session = options.global.session(&config);

    // Positions are indexes into the full pending list, as `tt mv` expects.
    let visible: Vec<(usize, &Task)> = session
        .pending()
        .iter()
        .enumerate()
        .filter(|(_, task)| mode == FilterMode::All || !task.is_completed)
        .collect();

    let mut human = HumanOutput::new(format!("tt list: {} pending", visible.len()));
    for (index, task) in &visible {
        human.push_detail(format!("{index}. {}", task_line(task)));
    }
    if visible.is_empty() {
        human.push_next_step("tt add <text>");
    }

    let report = ListReport {
        filter: mode,
        tasks: session.visible_pending(mode),
    };
    emit_success(options.global.output(), "list", &report, Some(&human))
}

pub fn run_completed(global: GlobalArgs) -> Result<()> {
    let config = global.config()?;
    let session = global.session(&config);

    let mut human = HumanOutput::new(format!("tt completed: {}", session.completed().len()));
    for task in session.completed() {
        let mut line = task_line(task);
        if let Some(at) = task.completed_at {
            line.push_str(&format!(" done {}", at.format("%Y-%m-%d %H:%M")));
        }
        human.push_detail(line);
    }
    if let Some(first) = session.completed().first() {
        human.push_next_step(format!("tt archive {}", short_id(&first.id)));
    }

    emit_success(global.output(), "completed", &session.completed(), Some(&human))
}

pub fn run_history(options: HistoryOptions) -> Result<()> {
    let config = options.global.config()?;
    let date = match options.date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(date) => Some(parse_date(date)?.format("%Y-%m-%d").to_string()),
    };
    let sort = options
        .sort
        .clone()
        .unwrap_or_else(|| config.view.history_sort.as_str().to_string());
    let session = options.global.session(&config);

    let tasks = session.history_view(date.as_deref(), &sort);

    let mut human = HumanOutput::new(format!("tt history: {}", tasks.len()));
    human.push_summary("sort", sort.clone());
    if let Some(date) = &date {
        human.push_summary("date", date.clone());
    }
    if HistorySort::parse(&sort).is_none() {
        let keys: Vec<&str> = HistorySort::ALL.iter().map(|key| key.as_str()).collect();
        human.push_warning(format!(
            "unknown sort '{sort}', showing stored order (expected one of {})",
            keys.join(", ")
        ));
    }
    for task in &tasks {
        let done = task
            .completed_at
            .map(|at| query::utc_date(at).to_string())
            .unwrap_or_else(|| "-".to_string());
        human.push_detail(format!("{done} {}", task_line(task)));
    }

    let report = HistoryReport { date, sort, tasks };
    emit_success(options.global.output(), "history", &report, Some(&human))
}

pub fn run_progress(global: GlobalArgs) -> Result<()> {
    let config = global.config()?;
    let session = global.session(&config);
    let report = session.progress();

    let mut human = HumanOutput::new(format!("tt progress: {:.0}%", report.percent));
    human.push_summary("pending", report.pending.to_string());
    human.push_summary("completed", report.completed.to_string());
    human.push_summary("history", report.history.to_string());

    emit_success(global.output(), "progress", &report, Some(&human))
}

pub fn run_chart(global: GlobalArgs) -> Result<()> {
    let config = global.config()?;
    let session = global.session(&config);
    let series = session.chart();

    let mut human = HumanOutput::new(format!("tt chart: {} points", series.len()));
    for point in &series {
        let bar = if point.status == 1 { "#" } else { "." };
        human.push_detail(format!("{bar} {}", point.name));
    }

    emit_success(global.output(), "chart", &series, Some(&human))
}
