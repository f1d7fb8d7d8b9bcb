//! Error type for the CLI wrapper.
//!
//! A CLI command that ran and reported a failure is not an error at this
//! level, it is a [`CommandOutcome::Failed`](crate::CommandOutcome::Failed).
//! `WrapperError` covers the cases where no meaningful outcome exists.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the wrapper itself.
#[derive(Debug, Error)]
pub enum WrapperError {
    /// The CLI binary could not be started or its pipes failed.
    #[error("Failed to run `{program}`: {source}\n\nHint: Install the Kinvey CLI with `npm install -g kinvey-cli`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The CLI reported an error for a command the wrapper depends on.
    #[error("{0}")]
    Command(String),

    /// The CLI answered with a result the wrapper could not interpret.
    #[error("Unexpected output from `{command}`: {reason}")]
    UnexpectedOutput { command: String, reason: String },

    /// Neither the profile nor the caller supplied an app or org.
    #[error("No active app or org found for the profile\n\nHint: Run `kinvey app use <app>` or `kinvey org use <org>`, or pass a domain explicitly")]
    NoActiveDomain,

    /// Reading or writing the project file failed.
    #[error("Project file error at {}: {source}", path.display())]
    ProjectFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The project file exists but is not valid JSON.
    #[error("Invalid project file at {}: {source}", path.display())]
    InvalidProjectFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = WrapperError> = std::result::Result<T, E>;
