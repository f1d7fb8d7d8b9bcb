//! Deploy command implementation.

use crate::cli::DeployArgs;
use crate::commands::utils;
use crate::config::{ConfigOverrides, ScriptsConfig};
use crate::deploy::{coerce, Deployer, ReleaseType, VersionPlan};
use crate::error::{CliError, Result};
use crate::ui;
use kinvey_cli_wrapper::{CliContext, KinveyCli};
use semver::Version;

/// Execute the deploy command.
///
/// # Errors
///
/// Returns [`CliError::Deploy`] when any step of the deploy stops.
pub async fn execute(args: DeployArgs) -> Result<()> {
    let root = utils::resolve_project_root(args.cwd.as_deref())?;
    let config = ScriptsConfig::load(&root, None, &ConfigOverrides::default())?;

    let plan = VersionPlan {
        requested: requested_version(args.release_version.as_deref()),
        release: ReleaseType::from_flags(args.major, args.minor),
        skip_version_checks: args.skip_version_checks,
    };

    ui::clear_console();

    let cli = KinveyCli::new(
        CliContext::new()
            .with_program(config.cli_program.clone())
            .with_project_dir(root.clone()),
    );
    Deployer::new(&cli, &root, plan)
        .with_build_dir(root.join(&config.build_dir))
        .run()
        .await
        .map(|_| ())
        .map_err(CliError::from)
}

/// The `--version` value, or `None` with a warning when it cannot be read.
fn requested_version(raw: Option<&str>) -> Option<Version> {
    let raw = raw?;
    let version = coerce(raw);
    if version.is_none() {
        ui::error(&format!(
            "Unable to set version with -v or --version argument ({}). Falling back to default behavior.",
            raw
        ));
    }
    version
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_version() {
        assert_eq!(requested_version(None), None);
        assert_eq!(requested_version(Some("2.1")), Some(Version::new(2, 1, 0)));
        assert_eq!(requested_version(Some("next")), None);
    }
}
