//! One async method per Kinvey CLI subcommand.
//!
//! Arguments that identify the *subject* of a command (profile name, app
//! name, collection name) are passed positionally. Everything else travels
//! in [`CommandOptions`] and reaches the CLI as environment variables.

use crate::context::CliContext;
use crate::error::{Result, WrapperError};
use crate::model::{FlexServiceInfo, Profile};
use crate::options::CommandOptions;
use crate::outcome::CommandOutcome;
use crate::project::{Domain, FlexNamespace, ProjectSetup, SCHEMA_VERSION};
use crate::runner::{CommandRunner, Invocation, ProcessRunner};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extra settings accepted by `kinvey flex create`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlexCreateOptions {
    pub secret: Option<String>,
    pub vars: Option<String>,
    pub runtime: Option<String>,
}

impl FlexCreateOptions {
    fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (flag, value) in [
            ("--secret", &self.secret),
            ("--vars", &self.vars),
            ("--runtime", &self.runtime),
        ] {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value.clone());
            }
        }
        args
    }
}

/// Handle for running Kinvey CLI commands.
#[derive(Debug, Clone)]
pub struct KinveyCli<R = ProcessRunner> {
    context: CliContext,
    runner: R,
}

impl KinveyCli<ProcessRunner> {
    pub fn new(context: CliContext) -> Self {
        Self {
            context,
            runner: ProcessRunner,
        }
    }
}

impl<R: CommandRunner> KinveyCli<R> {
    pub fn with_runner(context: CliContext, runner: R) -> Self {
        Self { context, runner }
    }

    pub fn context(&self) -> &CliContext {
        &self.context
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs `kinvey <args>` and normalizes the output.
    ///
    /// # Errors
    ///
    /// Returns [`WrapperError::Spawn`] only when the process could not be run.
    /// CLI-reported failures come back as [`CommandOutcome::Failed`].
    pub async fn run<I, S>(&self, args: I, options: CommandOptions) -> Result<CommandOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let invocation = Invocation {
            program: self.context.program.clone(),
            args: args.into_iter().map(Into::into).collect(),
            env: options.to_env(&self.context),
            input: options.input,
        };

        debug!(command = %invocation.command_line(), "running kinvey cli");

        let output = self
            .runner
            .run(&invocation)
            .await
            .map_err(|source| WrapperError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let outcome = CommandOutcome::from_output(&invocation.program, &output);
        if let Some(message) = outcome.error() {
            debug!(command = %invocation.command_line(), error = message, "kinvey cli failed");
        }
        Ok(outcome)
    }

    async fn group(
        &self,
        group: &str,
        action: &str,
        subject: Option<&str>,
        extra: Vec<String>,
        options: CommandOptions,
    ) -> Result<CommandOutcome> {
        let mut args = vec![group.to_string(), action.to_string()];
        if let Some(subject) = subject {
            args.push(subject.to_string());
        }
        args.extend(extra);
        self.run(args, options).await
    }

    pub async fn cli_version(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.run(["--version"], options).await
    }

    // Profiles

    pub async fn create_profile(&self, name: &str, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("profile", "create", Some(name), vec![], options).await
    }

    pub async fn list_profiles(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("profile", "list", None, vec![], options).await
    }

    /// Shows `name`, or the active profile when `None`.
    pub async fn show_profile(&self, name: Option<&str>, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("profile", "show", name, vec![], options).await
    }

    pub async fn use_profile(&self, name: &str, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("profile", "use", Some(name), vec![], options).await
    }

    /// Re-authenticates a profile. The password is fed through stdin.
    pub async fn login_profile(
        &self,
        name: Option<&str>,
        password: &str,
        options: CommandOptions,
    ) -> Result<CommandOutcome> {
        let options = CommandOptions {
            password: None,
            ..options
        }
        .input(format!("\n{password}\n"));
        self.group("profile", "login", name, vec![], options).await
    }

    // Organizations

    pub async fn list_orgs(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("org", "list", None, vec![], options).await
    }

    pub async fn show_org(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("org", "show", None, vec![], options).await
    }

    pub async fn use_org(&self, org: &str, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("org", "use", Some(org), vec![], options).await
    }

    // Applications

    pub async fn list_apps(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("app", "list", None, vec![], options).await
    }

    pub async fn show_app(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("app", "show", None, vec![], options).await
    }

    pub async fn use_app(&self, app: &str, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("app", "use", Some(app), vec![], options).await
    }

    pub async fn create_app(&self, app: &str, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("app", "create", Some(app), vec![], options).await
    }

    pub async fn delete_app(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("app", "delete", None, vec![], options.no_prompt(true)).await
    }

    pub async fn apply_app(&self, file: Option<&Path>, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("app", "apply", None, file_args(file), options).await
    }

    pub async fn export_app(&self, file: Option<&Path>, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("app", "export", None, file_args(file), options).await
    }

    // App environments

    pub async fn list_app_envs(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("appenv", "list", None, vec![], options).await
    }

    pub async fn show_app_env(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("appenv", "show", None, vec![], options).await
    }

    pub async fn use_app_env(&self, env: &str, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("appenv", "use", Some(env), vec![], options).await
    }

    pub async fn create_app_env(&self, env: &str, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("appenv", "create", Some(env), vec![], options).await
    }

    pub async fn delete_app_env(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("appenv", "delete", None, vec![], options.no_prompt(true)).await
    }

    pub async fn apply_app_env(&self, file: Option<&Path>, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("appenv", "apply", None, file_args(file), options).await
    }

    pub async fn export_app_env(&self, file: Option<&Path>, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("appenv", "export", None, file_args(file), options).await
    }

    // Collections

    pub async fn list_collections(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("coll", "list", None, vec![], options).await
    }

    pub async fn create_collection(&self, name: &str, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("coll", "create", Some(name), vec![], options).await
    }

    pub async fn delete_collection(&self, name: &str, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("coll", "delete", Some(name), vec![], options.no_prompt(true)).await
    }

    // Flex services

    pub async fn create_flex_service(
        &self,
        name: &str,
        settings: &FlexCreateOptions,
        options: CommandOptions,
    ) -> Result<CommandOutcome> {
        self.group("flex", "create", Some(name), settings.to_args(), options).await
    }

    pub async fn delete_flex_service(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("flex", "delete", None, vec![], options.no_prompt(true)).await
    }

    pub async fn list_flex_services(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("flex", "list", None, vec![], options).await
    }

    pub async fn show_flex_service(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("flex", "show", None, vec![], options).await
    }

    pub async fn deploy_flex_service(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("flex", "deploy", None, vec![], options).await
    }

    /// Shows a deployment job; the most recent one when `job_id` is `None`.
    pub async fn show_flex_service_job(&self, job_id: Option<&str>, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("flex", "job", job_id, vec![], options).await
    }

    pub async fn show_flex_service_status(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("flex", "status", None, vec![], options).await
    }

    pub async fn show_flex_service_logs(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("flex", "logs", None, vec![], options).await
    }

    pub async fn update_flex_service(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("flex", "update", None, vec![], options).await
    }

    pub async fn recycle_flex_service(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("flex", "recycle", None, vec![], options).await
    }

    pub async fn clear_flex_service(&self, options: CommandOptions) -> Result<CommandOutcome> {
        self.group("flex", "clear", None, vec![], options).await
    }

    /// Links a service directory to a flex service.
    ///
    /// The domain comes from the profile's active app, then its active org,
    /// then `fallback`. The service's name and environment id are looked up
    /// with `kinvey flex show` and the result is written to the `.kinvey`
    /// file in `project_dir` (or the context's project directory).
    ///
    /// # Errors
    ///
    /// - [`WrapperError::Command`] if a CLI call fails
    /// - [`WrapperError::NoActiveDomain`] if no domain can be determined
    /// - [`WrapperError::ProjectFile`] if the `.kinvey` file cannot be written
    pub async fn init_flex_service(
        &self,
        service_id: &str,
        profile: Option<&str>,
        project_dir: Option<&Path>,
        fallback: Option<(Domain, String)>,
    ) -> Result<FlexNamespace> {
        let shown = self
            .show_profile(profile, CommandOptions::new())
            .await?;
        let profile: Profile = expect_result(&shown, "profile show")?;

        let (domain, domain_entity_id) = if let Some(app) = &profile.active.app {
            (Domain::App, app.id.clone())
        } else if let Some(org) = &profile.active.org {
            (Domain::Org, org.id.clone())
        } else {
            fallback.ok_or(WrapperError::NoActiveDomain)?
        };

        let mut options = CommandOptions::new().service(service_id);
        if !profile.name.is_empty() {
            options = options.profile(profile.name.clone());
        }
        let service = self.show_flex_service(options).await?;
        let info: FlexServiceInfo = expect_result(&service, "flex show")?;

        let namespace = FlexNamespace {
            domain,
            domain_entity_id,
            service_id: service_id.to_string(),
            service_name: info.service_name,
            svc_env_id: info.svc_env_id,
            schema_version: SCHEMA_VERSION,
        };

        let dir = self.resolve_project_dir(project_dir)?;
        write_flex_namespace(&dir, &profile.name, &namespace)?;
        Ok(namespace)
    }

    fn resolve_project_dir(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = explicit {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.context.project_dir {
            return Ok(dir.clone());
        }
        std::env::current_dir().map_err(|source| WrapperError::ProjectFile {
            path: PathBuf::from("."),
            source,
        })
    }
}

/// Writes `namespace` for `profile` into the `.kinvey` file in `dir`.
pub fn write_flex_namespace(dir: &Path, profile: &str, namespace: &FlexNamespace) -> Result<()> {
    let mut setup = ProjectSetup::load(dir)?;
    setup.set_flex_namespace(profile, namespace)?;
    setup.save()?;
    debug!(path = %setup.path().display(), profile, "wrote flex project settings");
    Ok(())
}

fn file_args(file: Option<&Path>) -> Vec<String> {
    match file {
        Some(path) => vec!["--file".to_string(), path.to_string_lossy().into_owned()],
        None => Vec::new(),
    }
}

fn expect_result<T: serde::de::DeserializeOwned>(outcome: &CommandOutcome, command: &str) -> Result<T> {
    if let Some(message) = outcome.error() {
        return Err(WrapperError::Command(message.to_string()));
    }
    match outcome.parse_result::<T>() {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(WrapperError::UnexpectedOutput {
            command: command.to_string(),
            reason: "missing `result`".to_string(),
        }),
        Err(err) => Err(WrapperError::UnexpectedOutput {
            command: command.to_string(),
            reason: err.to_string(),
        }),
    }
}
