//! Error types for stackpilot.
//!
//! All errors use `thiserror` for ergonomic error handling and proper error chains.

use crate::types::StackEvent;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for stackpilot operations.
pub type Result<T> = std::result::Result<T, StackError>;

/// Main error type for stackpilot.
#[derive(Error, Debug)]
pub enum StackError {
    // Argument errors
    #[error("Invalid argument: {reason}")]
    Validation { reason: String },

    // Local file content errors
    #[error("Line {line} is not a valid environment variable definition: {content:?}")]
    MalformedEnvLine { line: usize, content: String },

    #[error("Invalid tag file: {reason}")]
    MalformedTagFile { reason: String },

    #[error("Invalid template: {reason}")]
    InvalidTemplate { reason: String },

    #[error("Invalid parameters file at {path:?}: {reason}")]
    InvalidParameters { path: PathBuf, reason: String },

    #[error("File read error: {path:?}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Control plane errors
    #[error("{operation} failed for stack {stack}: {message}")]
    RemoteRequest { operation: String, stack: String, code: Option<String>, message: String },

    #[error("Timed out after {}s waiting for stack {stack} to reach {event}", waited.as_secs())]
    WaitTimeout { stack: String, event: StackEvent, waited: Duration },

    #[error("Stack {stack} did not reach {event}: {reason}")]
    WaitFailure { stack: String, event: StackEvent, reason: String },

    #[error("Could not build {operation} request for stack {stack}: {reason}")]
    RequestBuild { operation: String, stack: String, reason: String },

    #[error("Another operation is already in progress for stack {stack}")]
    StackBusy { stack: String },

    // Configuration errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl StackError {
    /// Shorthand for a validation failure.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation { reason: reason.into() }
    }

    /// Provider error code for remote failures, if the control plane sent one.
    pub fn remote_code(&self) -> Option<&str> {
        match self {
            Self::RemoteRequest { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
