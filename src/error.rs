//! Error types for orgtask
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, invalid state, bad config)
//! - 3: Blocked by policy (role or scope denies the action)
//! - 4: Operation failed (storage, locking, serialization)
//! - 5: Referenced task or organization does not exist

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the orgtask CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const POLICY_BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
    pub const NOT_FOUND: i32 = 5;
}

/// Main error type for orgtask operations
#[derive(Error, Debug)]
pub enum Error {
    // Not found (exit code 5)
    #[error("Not found: {0}")]
    NotFound(String),

    // Policy blocks (exit code 3)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    // User errors (exit code 2)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Storage failures (exit code 4)
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

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotFound(_) => exit_codes::NOT_FOUND,

            Error::PermissionDenied(_) => exit_codes::POLICY_BLOCKED,

            Error::InvalidState(_) | Error::InvalidArgument(_) | Error::InvalidConfig(_) => {
                exit_codes::USER_ERROR
            }

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::Storage(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// HTTP-equivalent status for callers that sit behind a web layer
    pub fn status_code(&self) -> u16 {
        match self.exit_code() {
            exit_codes::NOT_FOUND => 404,
            exit_codes::POLICY_BLOCKED => 403,
            exit_codes::USER_ERROR => 400,
            _ => 500,
        }
    }

    /// True when the store collaborator failed (as opposed to a rejected request)
    pub fn is_storage_failure(&self) -> bool {
        self.exit_code() == exit_codes::OPERATION_FAILED
    }

    /// Structured details for JSON output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound(message)
            | Error::PermissionDenied(message)
            | Error::InvalidState(message)
            | Error::InvalidArgument(message)
            | Error::InvalidConfig(message)
            | Error::Storage(message) => Some(serde_json::json!({ "message": message })),
            Error::LockFailed(path) => Some(serde_json::json!({
                "path": path.to_string_lossy(),
            })),
            _ => None,
        }
    }
}

/// Result type alias for orgtask operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    pub http_status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            http_status: err.status_code(),
            details: err.details(),
        }
    }
}
