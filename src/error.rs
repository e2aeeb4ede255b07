//! Error handling for soxgate
//!
//! Every failure an operation can report is one of a closed set of kinds,
//! so callers can match exhaustively instead of parsing messages.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::Status;

/// Result type alias for soxgate operations
pub type Result<T> = std::result::Result<T, SoxError>;

/// Main error type for soxgate operations
#[derive(Error, Debug)]
pub enum SoxError {
    // Input Errors
    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Invalid audio input {}: {reason}", .path.display())]
    InvalidInput { path: PathBuf, reason: String },

    #[error("Audio has zero duration: {}", .path.display())]
    ZeroDuration { path: PathBuf },

    #[error("Invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("None of the inputs exist")]
    NoInputs,

    // Engine Errors
    #[error("{operation} failed with engine status {status}{}", format_stderr(.stderr))]
    EngineFailed {
        operation: String,
        status: Status,
        stderr: Option<String>,
    },

    #[error("Engine reported success but no output was written: {}", .path.display())]
    OutputNotProduced { path: PathBuf },

    #[error("Engine binary could not be launched: {}", .binary.display())]
    EngineUnavailable {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine worker has stopped")]
    WorkerStopped,

    // Configuration Errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_stderr(stderr: &Option<String>) -> String {
    match stderr.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => format!(": {}", text),
        _ => String::new(),
    }
}

impl SoxError {
    pub(crate) fn engine_failed(operation: impl Into<String>, status: Status) -> Self {
        SoxError::EngineFailed {
            operation: operation.into(),
            status,
            stderr: None,
        }
    }

    pub(crate) fn invalid_parameter(reason: impl Into<String>) -> Self {
        SoxError::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SoxError::FileNotFound { .. } => "FILE_NOT_FOUND",
            SoxError::InvalidInput { .. } => "INVALID_INPUT",
            SoxError::ZeroDuration { .. } => "ZERO_DURATION",
            SoxError::InvalidParameter { .. } => "INVALID_PARAMETER",
            SoxError::NoInputs => "NO_INPUTS",
            SoxError::EngineFailed { .. } => "ENGINE_FAILED",
            SoxError::OutputNotProduced { .. } => "OUTPUT_NOT_PRODUCED",
            SoxError::EngineUnavailable { .. } => "ENGINE_UNAVAILABLE",
            SoxError::WorkerStopped => "WORKER_STOPPED",
            SoxError::Config { .. } => "CONFIG_ERROR",
            SoxError::Io(_) => "IO_ERROR",
            SoxError::Json(_) => "JSON_ERROR",
        }
    }

    /// Whether the caller can fix the request and try again.
    ///
    /// Nothing is retried automatically.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SoxError::FileNotFound { .. }
                | SoxError::InvalidParameter { .. }
                | SoxError::NoInputs
                | SoxError::EngineUnavailable { .. }
                | SoxError::Config { .. }
        )
    }
}
