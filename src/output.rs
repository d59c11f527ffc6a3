//! Human and JSON rendering of command results.
//!
//! Human output is a header line, aligned `key: value` facts, indented
//! detail lines (usually one per task), then `warning:` and `next:` lines.
//! With `--json` the same result is printed as one `tt.v1` envelope on
//! stdout, for successes and failures alike.

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "tt.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Human rendering of one command result.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    facts: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            facts: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.facts.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

#[derive(Serialize)]
struct SuccessEnvelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    data: &'a T,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    warnings: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    next_steps: &'a [String],
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    error: ErrorBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let payload = SuccessEnvelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings: human.map(|h| h.warnings.as_slice()).unwrap_or_default(),
            next_steps: human.map(|h| h.next_steps.as_slice()).unwrap_or_default(),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if let Some(human) = human.filter(|_| !options.quiet) {
        println!("{}", format_human(human));
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hint = error_hint(err);
    if json {
        let payload = ErrorEnvelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            },
            hint,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = vec![output.header.clone()];

    let width = output
        .facts
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);
    for (key, value) in &output.facts {
        if value.is_empty() {
            lines.push(format!("  {key}"));
        } else {
            lines.push(format!("  {key:<width$}  {value}"));
        }
    }
    lines.extend(output.details.iter().map(|detail| format!("  {detail}")));
    lines.extend(output.warnings.iter().map(|warning| format!("warning: {warning}")));
    lines.extend(output.next_steps.iter().map(|step| format!("next: {step}")));

    lines.join("\n")
}

/// Stable machine-readable error category.
pub fn error_kind(err: &Error) -> &'static str {
    match err {
        Error::InvalidConfig(_) => "invalid_config",
        Error::InvalidArgument(_) => "invalid_argument",
        Error::TaskNotFound { .. } => "not_found",
        Error::Rejected(_) => "rejected",
        Error::LockFailed(_) => "locked",
        Error::Io(_) | Error::Json(_) | Error::SaveFailed { .. } => "storage",
    }
}

fn error_hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::TaskNotFound { list, .. } => Some(match list.as_str() {
            "completed" => "tt completed",
            "history" => "tt history",
            _ => "tt list --filter all",
        }),
        Error::Rejected(_) => Some("tt draft show"),
        Error::InvalidConfig(_) => Some("fix config.toml then retry"),
        Error::LockFailed(_) => Some("retry once the other tt process finishes"),
        _ => None,
    }
}
