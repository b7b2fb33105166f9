//! Error types for planviz
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown project, invalid config)
//! - 4: Operation failed (IO, serialization, lock contention)

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Exit codes for the planviz CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for planviz operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid project document: {0}")]
    InvalidDocument(String),

    #[error("No data directory available; pass --data-dir or set PLANVIZ_DATA_DIR")]
    DataDirUnavailable,

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

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
            // User errors
            Error::ProjectNotFound(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::InvalidDocument(_)
            | Error::DataDirUnavailable => exit_codes::USER_ERROR,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for the JSON error envelope
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::ProjectNotFound(id) => Some(serde_json::json!({ "project_id": id })),
            Error::LockFailed(path) => Some(serde_json::json!({ "path": path })),
            _ => None,
        }
    }
}

/// Result type alias for planviz operations
pub type Result<T> = std::result::Result<T, Error>;
