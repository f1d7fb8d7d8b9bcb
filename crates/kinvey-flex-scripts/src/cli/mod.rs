//! Command-line interface definition for the flex scripts.
//!
//! # Command Structure
//!
//! - `kinvey-flex-scripts start` - run the service behind the dev relay
//! - `kinvey-flex-scripts deploy` - bump the version and deploy with the Kinvey CLI
//! - `kinvey-flex-scripts init` - turn an npm project into a flex service
//! - `kinvey-flex-scripts create` - create a new flex service directory

mod commands;
mod validation;

use clap::Parser;

pub use commands::{Command, CreateArgs, DeployArgs, InitArgs, PackageManagerArgs, StartArgs};
pub use validation::{parse_package_name, validate_package_name};

/// Tooling for Kinvey Flex services
#[derive(Parser, Debug)]
#[command(
    name = "kinvey-flex-scripts",
    version,
    about = "Scaffolding, dev server and deploy tooling for Kinvey Flex services",
    long_about = "Creates Kinvey Flex service projects, runs them locally behind a relay\n\
                  that injects the Kinvey platform headers, and deploys them through\n\
                  the Kinvey CLI."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Also passes --verbose to npm during dependency installation.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
