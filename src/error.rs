//! Error types for tt
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, rejected input, unknown task)
//! - 4: Operation failed (storage I/O, serialization, lock timeout)
//!
//! The lifecycle, query and progress functions never produce these: input
//! that fails validation and ids that are absent are no-ops there. Errors only
//! come out of the storage write path, configuration loading and the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the tt CLI
pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tt operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Task not found in {list}: {id}")]
    TaskNotFound { list: String, id: String },

    #[error("Rejected: {0}")]
    Rejected(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Save failed for {key}: {reason}")]
    SaveFailed { key: String, reason: String },
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::TaskNotFound { .. }
            | Error::Rejected(_) => exit_codes::USER_ERROR,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::LockFailed(_)
            | Error::SaveFailed { .. } => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for the JSON error envelope, when the error has any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::TaskNotFound { list, id } => Some(serde_json::json!({
                "list": list,
                "id": id,
            })),
            Error::LockFailed(path) => Some(serde_json::json!({
                "lock": path.display().to_string(),
            })),
            Error::SaveFailed { key, .. } => Some(serde_json::json!({ "key": key })),
            _ => None,
        }
    }
}

/// Result type alias for tt operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_map_to_exit_code_two() {
        let errors = [
            Error::InvalidArgument("bad".to_string()),
            Error::InvalidConfig("bad".to_string()),
            Error::Rejected("too short".to_string()),
            Error::TaskNotFound {
                list: "todos".to_string(),
                id: "a".to_string(),
            },
        ];
        for err in errors {
            assert_eq!(err.exit_code(), exit_codes::USER_ERROR, "{err}");
        }
    }

    #[test]
    fn storage_errors_map_to_operation_failed() {
        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(io.exit_code(), exit_codes::OPERATION_FAILED);
        let lock = Error::LockFailed(PathBuf::from("/tmp/todos.json.lock"));
        assert_eq!(lock.exit_code(), exit_codes::OPERATION_FAILED);
        assert!(lock.details().is_some());
    }

    #[test]
    fn task_not_found_has_details() {
        let err = Error::TaskNotFound {
            list: "history".to_string(),
            id: "abc".to_string(),
        };
        let details = err.details().expect("details");
        assert_eq!(details["list"], "history");
        assert_eq!(details["id"], "abc");
        assert_eq!(err.to_string(), "Task not found in history: abc");
    }
}
