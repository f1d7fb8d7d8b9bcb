//! Child processes behind the dev proxy.
//!
//! Two kinds of children run during `start`:
//!
//! - an optional build command that keeps the bundle current
//! - the flex service itself, launched from the bundle
//!
//! Both are killed when their handle is dropped.

use crate::error::{CliError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info};

/// Variables every child process receives.
pub fn development_env() -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert("NODE_ENV".to_string(), "development".to_string());
    env.insert("BABEL_ENV".to_string(), "development".to_string());
    env
}

/// Starts a shell command in the project directory.
///
/// # Errors
///
/// Returns [`CliError::Process`] when the shell cannot be started.
pub fn spawn_build_command(
    command: &str,
    cwd: &Path,
    env: &BTreeMap<String, String>,
) -> Result<Child> {
    let mut shell = if cfg!(windows) {
        let mut shell = Command::new("cmd");
        shell.args(["/C", command]);
        shell
    } else {
        let mut shell = Command::new("sh");
        shell.args(["-c", command]);
        shell
    };

    info!(command, "starting build command");
    shell
        .current_dir(cwd)
        .envs(env)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| CliError::Process(format!("failed to start `{command}`: {e}")))
}

/// Waits until `path` exists and is non-empty.
///
/// # Errors
///
/// Returns [`CliError::Process`] when `timeout` elapses first.
pub async fn wait_for_file(path: &Path, timeout: Duration, poll: Duration) -> Result<()> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Ok(meta) = tokio::fs::metadata(path).await {
            if meta.is_file() && meta.len() > 0 {
                return Ok(());
            }
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(CliError::Process(format!(
                "timed out after {}s waiting for {}",
                timeout.as_secs(),
                path.display()
            )));
        }
        tokio::time::sleep(poll).await;
    }
}

/// Launches and restarts the flex service from its bundle.
#[derive(Debug, Clone)]
pub struct ServiceLauncher {
    runtime: String,
    bundle: PathBuf,
    cwd: PathBuf,
    env: BTreeMap<String, String>,
}

impl ServiceLauncher {
    pub fn new(
        runtime: impl Into<String>,
        bundle: PathBuf,
        cwd: PathBuf,
        env: BTreeMap<String, String>,
    ) -> Self {
        Self {
            runtime: runtime.into(),
            bundle,
            cwd,
            env,
        }
    }

    /// Starts `<runtime> <bundle>`.
    pub fn spawn(&self) -> Result<ServiceProcess> {
        let child = Command::new(&self.runtime)
            .arg(&self.bundle)
            .current_dir(&self.cwd)
            .envs(&self.env)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CliError::Process(format!(
                    "failed to launch `{} {}`: {}",
                    self.runtime,
                    self.bundle.display(),
                    e
                ))
            })?;

        debug!(pid = child.id(), bundle = %self.bundle.display(), "service started");
        Ok(ServiceProcess { child })
    }

    /// Stops `current` and starts a fresh process.
    pub async fn restart(&self, current: ServiceProcess) -> Result<ServiceProcess> {
        current.stop().await;
        self.spawn()
    }
}

/// A running flex service.
#[derive(Debug)]
pub struct ServiceProcess {
    child: Child,
}

impl ServiceProcess {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    pub async fn stop(mut self) {
        if let Err(err) = self.child.kill().await {
            debug!(error = %err, "service already stopped");
        }
    }
}
