//! Async wrapper around the Kinvey command line tool.
//!
//! Every `kinvey` subcommand is exposed as an async method on [`KinveyCli`].
//! Each call spawns the CLI with JSON output forced on, then folds whatever
//! the process printed into a [`CommandOutcome`]:
//!
//! - anything on stderr becomes [`CommandOutcome::Failed`] carrying the last
//!   non-empty stderr line
//! - JSON on stdout becomes [`CommandOutcome::Parsed`]
//! - any other stdout becomes [`CommandOutcome::Raw`]
//!
//! Only failing to spawn the process at all surfaces as an `Err`.
//!
//! # Example
//!
//! ```rust,no_run
//! use kinvey_cli_wrapper::{CliContext, CommandOptions, KinveyCli};
//!
//! # async fn demo() -> kinvey_cli_wrapper::Result<()> {
//! let cli = KinveyCli::new(CliContext::new().with_project_dir("/srv/my-service"));
//! let status = cli
//!     .show_flex_service_status(CommandOptions::new().service("svc-123"))
//!     .await?;
//!
//! if let Some(message) = status.error() {
//!     eprintln!("status failed: {message}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod context;
pub mod error;
pub mod model;
pub mod options;
pub mod outcome;
pub mod project;
pub mod runner;

pub use commands::{FlexCreateOptions, KinveyCli};
pub use context::CliContext;
pub use error::{Result, WrapperError};
pub use model::{DeploymentJob, EntityRef, FlexServiceInfo, FlexStatus, Profile, ProfileSummary};
pub use options::CommandOptions;
pub use outcome::CommandOutcome;
pub use project::{Domain, FlexNamespace, ProjectSetup, PROJECT_FILE, SCHEMA_VERSION};
pub use runner::{CommandRunner, Invocation, ProcessRunner, RawOutput};
