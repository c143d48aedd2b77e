//! Error types for autosnap.
//!
//! This module provides a unified error type [`AutosnapError`] for all
//! autosnap operations, along with a convenient [`Result`] type alias.
//!
//! # Error Categories
//!
//! - **Discovery**: volume property resolution failed; the affected volumes
//!   are skipped for the current pass and picked up again on the next
//!   periodic invocation.
//! - **Creation**: snapshot creation failed; pruning is skipped for that
//!   volume this pass. Self-heals on the next pass because the due-check is
//!   re-derived from store state.
//! - **Destruction**: destroying one old snapshot failed; other destructions
//!   and other volumes proceed. Retention converges on a later pass.
//! - **Parse**: a collaborator produced output this crate could not decode.
//!   Distinct from availability errors so malformed output is never mistaken
//!   for a store outage.
//! - **Command**: an external store invocation failed or exceeded its
//!   deadline.
//! - **Configuration**: invalid settings; the only category fatal to the
//!   process.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for autosnap operations.
#[derive(Error, Debug)]
pub enum AutosnapError {
    // Discovery errors
    #[error("Discovery failed: {0}")]
    Discovery(String),

    // Snapshot lifecycle errors
    #[error("Failed to create snapshot {snapshot}: {reason}")]
    Creation { snapshot: String, reason: String },

    #[error("Failed to destroy snapshot {snapshot}: {reason}")]
    Destruction { snapshot: String, reason: String },

    // Collaborator output errors
    #[error(transparent)]
    Parse(#[from] ParseError),

    // External command errors
    #[error("Command `{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("Command `{command}` timed out after {timeout:?}")]
    CommandTimeout { command: String, timeout: Duration },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // External errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AutosnapError {
    /// Check if the error clears on its own via the next periodic
    /// invocation, with no operator action required.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AutosnapError::Discovery(_)
                | AutosnapError::Creation { .. }
                | AutosnapError::Destruction { .. }
                | AutosnapError::CommandFailed { .. }
                | AutosnapError::CommandTimeout { .. }
        )
    }
}

/// Errors produced while decoding collaborator output lines.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed snapshot line {line:?}: {reason}")]
    SnapshotLine { line: String, reason: String },

    #[error("Malformed property line {line:?}: {reason}")]
    PropertyLine { line: String, reason: String },

    #[error("Invalid time of day {value:?}: expected HH:MM")]
    TimeOfDay { value: String },

    #[error("Invalid timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },
}

impl From<serde_json::Error> for AutosnapError {
    fn from(e: serde_json::Error) -> Self {
        AutosnapError::Config(e.to_string())
    }
}

/// Result type alias for autosnap operations.
pub type Result<T> = std::result::Result<T, AutosnapError>;
