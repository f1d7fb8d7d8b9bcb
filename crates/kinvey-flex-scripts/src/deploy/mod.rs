//! Deploy sequence for a flex service.
//!
//! Runs the Kinvey CLI step by step and stops at the first problem:
//!
//! 1. `flex status` guards against running deployments and version drift
//! 2. the next version is computed and written to `build/package.json`
//! 3. an active profile is ensured
//! 4. `flex show` names the target service
//! 5. `flex deploy` starts the job
//!
//! Nothing is rolled back when a later step fails.

mod manifest;
mod version;

pub use manifest::BuildManifest;
pub use version::{bump, coerce, ReleaseType, VersionPlan};

use crate::error::DeployError;
use crate::ui;
use kinvey_cli_wrapper::{
    CommandOptions, CommandOutcome, CommandRunner, DeploymentJob, FlexServiceInfo, FlexStatus,
    KinveyCli, Profile, ProfileSummary, ProjectSetup,
};
use semver::Version;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing::{debug, info};

const STATUS_ONLINE: &str = "ONLINE";
const STATUS_COMPLETED: &str = "COMPLETED";

/// What a finished deploy did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    /// Version written to the build manifest, when status was available
    pub version: Option<Version>,
    pub profile: String,
    pub service_name: String,
    pub job_id: Option<String>,
}

/// Drives one deploy through a [`KinveyCli`].
pub struct Deployer<'a, R> {
    cli: &'a KinveyCli<R>,
    project_dir: PathBuf,
    build_dir: PathBuf,
    plan: VersionPlan,
}

impl<'a, R: CommandRunner> Deployer<'a, R> {
    pub fn new(cli: &'a KinveyCli<R>, project_dir: impl Into<PathBuf>, plan: VersionPlan) -> Self {
        let project_dir = project_dir.into();
        Self {
            cli,
            build_dir: project_dir.join("build"),
            project_dir,
            plan,
        }
    }

    pub fn with_build_dir(mut self, build_dir: impl Into<PathBuf>) -> Self {
        self.build_dir = build_dir.into();
        self
    }

    /// Runs the whole sequence.
    ///
    /// # Errors
    ///
    /// Returns the [`DeployError`] of the first step that stopped the deploy.
    pub async fn run(&self) -> Result<DeployReport, DeployError> {
        if !ProjectSetup::exists(&self.project_dir) {
            return Err(DeployError::NotInitialized(self.project_dir.clone()));
        }

        let version = self.prepare_version().await?;
        let profile = self.ensure_profile().await?;

        let shown = self.cli.show_flex_service(CommandOptions::new()).await?;
        let service: FlexServiceInfo = required(&shown, "flex show")?;
        eprintln!();
        ui::info(&format!("Deploying to: {}", service.service_name));

        let deployed = self.cli.deploy_flex_service(CommandOptions::new()).await?;
        if let Some(message) = deployed.error() {
            return Err(DeployError::Unhandled(message.to_string()));
        }
        let job: Option<DeploymentJob> = optional(&deployed, "flex deploy")?;
        let job_id = job.and_then(|job| job.id);

        if let Some(id) = &job_id {
            eprintln!();
            ui::success("Deployment complete.");
            eprintln!();
            ui::info(&format!("Job Id: {}", id));
            eprintln!();
            eprintln!("to check deployment status, run:");
            ui::command("kinvey flex status");
            eprintln!();
        }

        info!(service = %service.service_name, job = ?job_id, "deploy started");
        Ok(DeployReport {
            version,
            profile,
            service_name: service.service_name,
            job_id,
        })
    }

    /// Status checks and manifest rewrite. Skipped when the CLI returns no status.
    async fn prepare_version(&self) -> Result<Option<Version>, DeployError> {
        let outcome = self
            .cli
            .show_flex_service_status(CommandOptions::new())
            .await?;
        let Some(status) = optional::<FlexStatus>(&outcome, "flex status")? else {
            debug!("no flex status returned, keeping build version");
            return Ok(None);
        };

        let service_status = status.status.to_uppercase();
        let deployment_status = status.deployment.status.to_uppercase();

        eprintln!("Flex Service Status");
        ui::field("status", &service_status, service_status == STATUS_ONLINE);
        ui::field("version", &status.version, true);
        ui::field(
            "deployment status",
            &deployment_status,
            deployment_status == STATUS_COMPLETED,
        );
        ui::field("deployment version", &status.deployment.version, true);

        if status.is_deploying() {
            return Err(DeployError::DeploymentInProgress);
        }

        if !self.plan.skip_version_checks && status.version != status.deployment.version {
            return Err(DeployError::VersionMismatch {
                running: status.version,
                deployed: status.deployment.version,
            });
        }

        let mut manifest = BuildManifest::load(&self.build_dir)?;
        let next = self
            .plan
            .next_version(&status.deployment.version, manifest.version())?;
        manifest.set_version(&next);
        manifest.save()?;
        debug!(version = %next, path = %manifest.path().display(), "updated build version");

        Ok(Some(next))
    }

    /// The active profile, or the first known profile made active.
    async fn ensure_profile(&self) -> Result<String, DeployError> {
        let shown = self.cli.show_profile(None, CommandOptions::new()).await?;
        if !shown.is_failed() {
            if let Some(profile) = optional::<Profile>(&shown, "profile show")? {
                return Ok(profile.name);
            }
        }

        let listed = self.cli.list_profiles(CommandOptions::new()).await?;
        if listed.is_failed() {
            return Err(DeployError::NoActiveProfile);
        }
        let profiles: Vec<ProfileSummary> = optional(&listed, "profile list")?.unwrap_or_default();
        let Some(first) = profiles.into_iter().next() else {
            return Err(DeployError::NoActiveProfile);
        };

        ui::info(&format!("Setting active profile to: {}.", first.profile));
        let used = self
            .cli
            .use_profile(&first.profile, CommandOptions::new())
            .await?;
        if let Some(message) = used.error() {
            return Err(DeployError::from_cli_message(message));
        }
        Ok(first.profile)
    }
}

/// Typed `result`, or `None` when the CLI answered without one.
fn optional<T: DeserializeOwned>(
    outcome: &CommandOutcome,
    command: &str,
) -> Result<Option<T>, DeployError> {
    if let Some(message) = outcome.error() {
        return Err(DeployError::from_cli_message(message));
    }
    outcome
        .parse_result()
        .map_err(|e| DeployError::Unhandled(format!("unexpected `kinvey {command}` output: {e}")))
}

fn required<T: DeserializeOwned>(outcome: &CommandOutcome, command: &str) -> Result<T, DeployError> {
    optional(outcome, command)?.ok_or_else(|| {
        DeployError::Unhandled(format!("`kinvey {command}` returned no result"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_maps_credentials_error() {
        let outcome = CommandOutcome::Failed(
            "[error] InvalidCredentials: Credentials are invalid. Please authenticate.".into(),
        );
        let err = optional::<FlexStatus>(&outcome, "flex status").unwrap_err();
        assert!(matches!(err, DeployError::InvalidCredentials));
    }

    #[test]
    fn test_optional_without_result() {
        let outcome = CommandOutcome::Raw("ok".into());
        assert!(optional::<FlexStatus>(&outcome, "flex status").unwrap().is_none());
    }

    #[test]
    fn test_required_rejects_bad_shape() {
        let outcome = CommandOutcome::Parsed(json!({"result": {"serviceName": 42}}));
        let err = required::<FlexServiceInfo>(&outcome, "flex show").unwrap_err();
        assert!(err.to_string().contains("flex show"));
    }
}
