//! Error types for todopad
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown task, bad config)
//! - 4: Operation failed (storage, I/O, serialization)

use std::path::PathBuf;
use thiserror::Error;

use crate::task::TaskId;

/// Exit codes for the todopad CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for todopad operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    // Task list persistence
    #[error("Failed to load tasks from '{key}': {source}")]
    LoadFailure {
        key: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to save tasks to '{key}': {source}")]
    WriteFailure {
        key: String,
        #[source]
        source: Box<Error>,
    },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::InvalidDate(_)
            | Error::TaskNotFound(_) => exit_codes::USER_ERROR,

            Error::LoadFailure { .. }
            | Error::WriteFailure { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    pub(crate) fn load_failure(key: &str, source: Error) -> Self {
        Error::LoadFailure {
            key: key.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn write_failure(key: &str, source: Error) -> Self {
        Error::WriteFailure {
            key: key.to_string(),
            source: Box::new(source),
        }
    }
}

/// Result type alias for todopad operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        let details = match err {
            Error::TaskNotFound(id) => Some(serde_json::json!({ "id": id })),
            Error::LoadFailure { key, .. } | Error::WriteFailure { key, .. } => {
                Some(serde_json::json!({ "key": key }))
            }
            _ => None,
        };
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details,
        }
    }
}
