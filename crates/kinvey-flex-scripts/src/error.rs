//! Error handling for the flex scripts.
//!
//! Errors are grouped the same way the commands are:
//!
//! - [`CliError`] is what every command returns
//! - [`ConfigError`] covers settings and environment loading
//! - [`DeployError`] covers the deploy sequence and its guard rails
//! - [`GeneratorError`] covers project generation
//!
//! Messages that the user can act on end with a `Hint:` line.
//!
//! # Example
//!
//! ```rust,no_run
//! use kinvey_flex_scripts::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_manifest(path: &Path) -> Result<serde_json::Value> {
//!     let text = std::fs::read_to_string(path).with_path(path)?;
//!     serde_json::from_str(&text).with_hint("Check package.json syntax")
//! }
//! ```

mod diagnostic;

pub use diagnostic::{cli_error_to_miette, deploy_error_to_miette};

use kinvey_cli_wrapper::WrapperError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type returned by commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings or environment could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The deploy sequence stopped
    #[error("Deploy failed: {0}")]
    Deploy(#[from] DeployError),

    /// Project generation failed
    #[error("Project generation failed: {0}")]
    Generator(#[from] GeneratorError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// The local service did not answer discovery
    #[error("Service discovery failed: {0}\n\nHint: Make sure the service listens on the flex url (default http://localhost:10001)")]
    Discovery(String),

    /// Spawning or supervising a child process failed
    #[error("Process error: {0}")]
    Process(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors from the Kinvey CLI wrapper
    #[error("{0}")]
    Wrapper(#[from] WrapperError),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Entry file of the service is missing
    #[error("Could not find a required file: {}\n\nHint: Flex services need a src/index.js entry, or set `entry` in flex-scripts.json", .0.display())]
    EntryNotFound(PathBuf),

    /// `.env` file exists but cannot be read or parsed
    #[error("Failed to load {}: {reason}\n\nHint: Lines must look like KEY=value", .path.display())]
    EnvFile { path: PathBuf, reason: String },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Reasons the deploy sequence stopped.
#[derive(Debug, Error)]
pub enum DeployError {
    /// No `.kinvey` file in the project
    #[error("Kinvey Flex Service is not initialized in this directory\n\nHint: Initialize using Kinvey-CLI, run `kinvey flex init`")]
    NotInitialized(PathBuf),

    /// The CLI session is not authenticated
    #[error("InvalidCredentials: Credentials are invalid. Please authenticate.\n\nHint: To authenticate, run `kinvey profile login`")]
    InvalidCredentials,

    /// A deployment job is still running
    #[error("Unable to deploy while another deployment is in progress.\n\nHint: To check deployment status, run `kinvey flex status`")]
    DeploymentInProgress,

    /// Running and deployed versions differ, another job may be in flight
    #[error("Unable to deploy while another deployment is in progress (running {running}, deployed {deployed}).\n\nHint: Check `kinvey flex status`, or use --skip-version-checks to skip this check")]
    VersionMismatch { running: String, deployed: String },

    /// The computed version would move backwards
    #[error("The new version ({new}) must be greater than the deployed version {deployed}.\n\nHint: Use --skip-version-checks to skip this check. But the deployment may fail.")]
    VersionNotGreater { new: String, deployed: String },

    /// No usable CLI profile
    #[error("Failed to get active profile.\n\nHint: kinvey-cli may not be initialized on your machine, run `kinvey init`")]
    NoActiveProfile,

    /// The CLI reported an error the sequence cannot handle
    #[error("UNHANDLED ERROR {0}")]
    Unhandled(String),

    /// The build manifest could not be read or written
    #[error("Build manifest error at {}: {reason}\n\nHint: Build the service before deploying", .path.display())]
    Manifest { path: PathBuf, reason: String },

    /// The CLI could not be run at all
    #[error(transparent)]
    Wrapper(#[from] WrapperError),
}

impl DeployError {
    /// Maps a CLI error line to a deploy error.
    pub fn from_cli_message(message: &str) -> Self {
        if message.contains("InvalidCredentials") {
            DeployError::InvalidCredentials
        } else {
            DeployError::Unhandled(message.to_string())
        }
    }
}

/// Project generation errors.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// No package.json in the service directory
    #[error("No package.json found in {}\n\nHint: Run `npm init` first, or use `kinvey-flex-scripts create <name>`", .0.display())]
    MissingPackageJson(PathBuf),

    /// The requested template directory does not exist
    #[error("Could not locate supplied template: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// Target directory already exists
    #[error("Directory '{}' already exists\n\nHint: Choose another name or remove the directory", .0.display())]
    DirectoryExists(PathBuf),

    /// Package manager exited with a failure
    #[error("`{0}` failed")]
    InstallFailed(String),

    /// Template dependency manifest is malformed
    #[error("Invalid template dependencies in {}: {reason}", .path.display())]
    InvalidTemplateDependencies { path: PathBuf, reason: String },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turns a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Appends a `Hint:` line to the error.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_not_found() {
        let err = ConfigError::EntryNotFound(PathBuf::from("src/index.js"));
        let msg = err.to_string();
        assert!(msg.contains("src/index.js"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_invalid_credentials_mapping() {
        let err = DeployError::from_cli_message(
            "[error] InvalidCredentials: Credentials are invalid. Please authenticate.",
        );
        assert!(matches!(err, DeployError::InvalidCredentials));
        assert!(err.to_string().contains("kinvey profile login"));

        let other = DeployError::from_cli_message("[error] ServiceNotFound");
        assert_eq!(other.to_string(), "UNHANDLED ERROR [error] ServiceNotFound");
    }

    #[test]
    fn test_version_not_greater_message() {
        let err = DeployError::VersionNotGreater {
            new: "1.0.0".into(),
            deployed: "2.0.0".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("(1.0.0)"));
        assert!(msg.contains("2.0.0"));
        assert!(msg.contains("--skip-version-checks"));
    }

    #[test]
    fn test_cli_error_from_deploy_error() {
        let cli_err: CliError = DeployError::NoActiveProfile.into();
        assert!(matches!(cli_err, CliError::Deploy(_)));
    }

    #[test]
    fn test_cli_error_from_generator_error() {
        let cli_err: CliError = GeneratorError::InstallFailed("npm install".into()).into();
        assert!(matches!(cli_err, CliError::Generator(_)));
        assert!(cli_err.to_string().contains("`npm install` failed"));
    }

    #[test]
    fn test_result_ext_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        let err = result.with_path("/svc/package.json").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_result_ext_with_hint() {
        let result: std::result::Result<(), ConfigError> =
            Err(ConfigError::EntryNotFound(PathBuf::from("src/index.js")));

        let err = result.with_hint("Create the entry file").unwrap_err();
        assert!(err.to_string().contains("Hint: Create the entry file"));
    }
}
