//! Miette diagnostic conversion for CLI errors.

use crate::error::{CliError, DeployError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Deploy(e) => deploy_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::Generator(e) => miette::miette!("{}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert DeployError to miette Report
pub fn deploy_error_to_miette(err: DeployError) -> Report {
    miette::miette!("deploy script failed\n\n{}", err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_error_report() {
        let report = cli_error_to_miette(DeployError::DeploymentInProgress.into());
        let text = report.to_string();
        assert!(text.starts_with("deploy script failed"));
        assert!(text.contains("kinvey flex status"));
    }

    #[test]
    fn test_plain_error_report() {
        let report = cli_error_to_miette(CliError::Custom("boom".into()));
        assert_eq!(report.to_string(), "boom");
    }
}
