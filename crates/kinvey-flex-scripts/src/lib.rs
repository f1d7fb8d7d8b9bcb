//! Tooling for Kinvey Flex services.
//!
//! The crate backs the `kinvey-flex-scripts` binary and exposes its pieces
//! as a library:
//!
//! - [`dev`] - local relay in front of the service with platform headers injected
//! - [`deploy`] - version checks, build manifest bump and deploy via the Kinvey CLI
//! - [`generator`] - project template and dependency installation
//! - [`config`] - figment-layered settings and the platform variables
//! - [`error`] - error types with actionable hints
//! - [`logger`] / [`ui`] - tracing setup and terminal output
//!
//! # Example
//!
//! ```rust,no_run
//! use kinvey_flex_scripts::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     // command implementations...
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod deploy;
pub mod dev;
pub mod error;
pub mod generator;
pub mod logger;
pub mod ui;

// Re-export commonly used types
pub use error::{CliError, ConfigError, DeployError, GeneratorError, Result, ResultExt};
