//! Settings for the flex scripts.
//!
//! Two independent sources feed the scripts:
//!
//! - [`ScriptsConfig`], tooling settings merged with figment.
//!   Priority: CLI > `PORT`/`HOST` > `FLEX_SCRIPTS_*` > `.env` > `flex-scripts.json` > defaults
//! - [`FlexEnvironment`], the platform variables (`KINVEY_*`,
//!   `FLEX_SHARED_SECRET`) read from the process environment with the
//!   project's `.env` file as fallback

mod env_file;
mod environment;
mod loading;
mod tests;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use env_file::EnvFile;
pub use environment::FlexEnvironment;
pub use loading::ConfigOverrides;

/// Optional tooling config file in the project root.
pub const CONFIG_FILE: &str = "flex-scripts.json";

/// Tooling settings for `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// First port tried for the dev proxy
    pub port: u16,

    /// Interface the dev proxy binds to
    pub host: String,

    /// Base url of the locally running service
    pub flex_url: String,

    /// Service entry file, relative to the project root
    pub entry: PathBuf,

    /// Bundle produced by the build step, relative to the project root
    pub bundle: PathBuf,

    /// Directory holding the deployable package.json
    pub build_dir: PathBuf,

    /// Shell command that keeps the bundle up to date (e.g. a bundler in watch mode)
    pub build_command: Option<String>,

    /// Runtime used to launch the bundle
    pub node: String,

    /// Restart the service when the bundle changes
    pub watch: bool,

    /// How long to wait for the bundle to appear
    pub bundle_timeout_secs: u64,

    /// Discovery attempts before giving up
    pub discovery_attempts: u32,

    /// Delay between discovery attempts
    pub discovery_interval_ms: u64,

    /// Kinvey CLI binary used by `deploy`
    pub cli_program: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            port: 9999,
            host: "0.0.0.0".to_string(),
            flex_url: "http://localhost:10001".to_string(),
            entry: PathBuf::from("src/index.js"),
            bundle: PathBuf::from("dist/index.js"),
            build_dir: PathBuf::from("build"),
            build_command: None,
            node: "node".to_string(),
            watch: true,
            bundle_timeout_secs: 60,
            discovery_attempts: 20,
            discovery_interval_ms: 500,
            cli_program: kinvey_cli_wrapper::context::DEFAULT_PROGRAM.to_string(),
        }
    }
}
