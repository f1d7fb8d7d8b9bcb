use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::validation::parse_package_name;
use crate::generator::PackageManager;

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the service locally behind the development relay
    ///
    /// Launches the bundled service, lists its handlers and relays requests
    /// to it with the Kinvey platform headers attached. Credentials are read
    /// from the environment and the project's .env file.
    Start(StartArgs),

    /// Deploy the service with the Kinvey CLI
    ///
    /// Checks the current deployment, bumps the version in
    /// build/package.json and starts a deployment job. The directory must be
    /// linked with `kinvey flex init` first.
    Deploy(DeployArgs),

    /// Set up an existing npm project as a flex service
    ///
    /// Rewrites package.json scripts, copies the service template and
    /// installs kinvey-flex-sdk.
    Init(InitArgs),

    /// Create a new flex service in a new directory
    Create(CreateArgs),
}

/// Arguments for the start command
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// First port to try for the relay [env: PORT] [default: 9999]
    ///
    /// The next ten ports are tried when it is busy.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Interface to bind [env: HOST] [default: 0.0.0.0]
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Base url of the locally running service [default: http://localhost:10001]
    #[arg(long, value_name = "URL")]
    pub flex_url: Option<String>,

    /// Bundle to launch, relative to the project root [default: dist/index.js]
    #[arg(long, value_name = "FILE")]
    pub bundle: Option<PathBuf>,

    /// Shell command that keeps the bundle up to date
    ///
    /// Runs alongside the service, e.g. a bundler in watch mode.
    #[arg(long, value_name = "COMMAND")]
    pub build_command: Option<String>,

    /// Do not restart the service when the bundle changes
    #[arg(long)]
    pub no_watch: bool,

    /// Project root (defaults to the nearest package.json)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for the deploy command
#[derive(Args, Debug, Default)]
pub struct DeployArgs {
    /// Bump the major version
    #[arg(long)]
    pub major: bool,

    /// Bump the minor version
    #[arg(long)]
    pub minor: bool,

    /// Deploy this exact version (loose forms like `2.1` are accepted)
    ///
    /// Unparseable values are ignored with a warning.
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    pub release_version: Option<String>,

    /// Skip the deployed-version checks
    #[arg(long)]
    pub skip_version_checks: bool,

    /// Project root (defaults to the nearest package.json)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Package manager selection shared by init and create
#[derive(Args, Debug, Default, Clone, Copy)]
pub struct PackageManagerArgs {
    /// Use npm as package manager
    #[arg(long, conflicts_with_all = ["use_yarn", "use_pnpm"])]
    pub use_npm: bool,

    /// Use Yarn as package manager
    #[arg(long, conflicts_with_all = ["use_npm", "use_pnpm"])]
    pub use_yarn: bool,

    /// Use pnpm as package manager
    #[arg(long, conflicts_with_all = ["use_npm", "use_yarn"])]
    pub use_pnpm: bool,
}

impl PackageManagerArgs {
    /// The forced manager, if any flag was given.
    pub fn selected(&self) -> Option<PackageManager> {
        if self.use_pnpm {
            Some(PackageManager::Pnpm)
        } else if self.use_yarn {
            Some(PackageManager::Yarn)
        } else if self.use_npm {
            Some(PackageManager::Npm)
        } else {
            None
        }
    }
}

/// Arguments for the init command
#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Service directory containing package.json (defaults to the current directory)
    #[arg(value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Template directory to copy instead of the built-in template
    #[arg(short, long, value_name = "DIR")]
    pub template: Option<PathBuf>,

    /// Do not install dependencies
    #[arg(long)]
    pub skip_install: bool,

    #[command(flatten)]
    pub package_manager: PackageManagerArgs,
}

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Name of the service, used as directory and npm package name
    #[arg(value_name = "NAME", value_parser = parse_package_name)]
    pub name: String,

    /// Template directory to copy instead of the built-in template
    #[arg(short, long, value_name = "DIR")]
    pub template: Option<PathBuf>,

    /// Do not install dependencies
    #[arg(long)]
    pub skip_install: bool,

    #[command(flatten)]
    pub package_manager: PackageManagerArgs,
}
