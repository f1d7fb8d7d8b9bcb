//! Dependency installation for generated services.

use crate::error::{GeneratorError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Package every flex service depends on.
pub const FLEX_SDK: &str = "kinvey-flex-sdk";

/// Extra dependencies a template may declare.
pub const TEMPLATE_DEPENDENCIES: &str = ".template.dependencies.json";

/// Package manager used for installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    /// Detect package manager from lock files.
    ///
    /// Detection order (highest priority first):
    /// 1. `pnpm-lock.yaml` → pnpm
    /// 2. `yarn.lock` → yarn
    /// 3. Default to npm (also covers package-lock.json)
    pub fn detect(project_dir: &Path) -> Self {
        if project_dir.join("pnpm-lock.yaml").exists() {
            PackageManager::Pnpm
        } else if project_dir.join("yarn.lock").exists() {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        }
    }

    /// Name shown to users in follow-up commands.
    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    /// `<pm> run <script>`, shortened where the manager allows it.
    pub fn run_script(&self, script: &str) -> String {
        match self {
            PackageManager::Npm => format!("npm run {}", script),
            PackageManager::Yarn | PackageManager::Pnpm => format!("{} {}", self.command(), script),
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// A resolved install command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub program: String,
    pub args: Vec<String>,
}

impl InstallPlan {
    /// Install `packages` with `manager`.
    pub fn new(manager: PackageManager, verbose: bool, packages: &[String]) -> Self {
        let (program, mut args) = match manager {
            PackageManager::Yarn => ("yarnpkg", vec!["add".to_string()]),
            PackageManager::Pnpm => ("pnpm", vec!["add".to_string()]),
            PackageManager::Npm => {
                let mut args = vec!["install".to_string(), "--save".to_string()];
                if verbose {
                    args.push("--verbose".to_string());
                }
                ("npm", args)
            }
        };
        args.extend(packages.iter().cloned());
        Self {
            program: program.to_string(),
            args,
        }
    }

    pub fn command_line(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }

    /// Runs the install in `cwd` with inherited stdio.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InstallFailed`] when the manager cannot be
    /// started or exits unsuccessfully.
    pub async fn run(&self, cwd: &Path) -> Result<()> {
        debug!(command = %self.command_line(), "installing dependencies");
        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(cwd)
            .status()
            .await
            .map_err(|e| {
                debug!(error = %e, "package manager did not start");
                GeneratorError::InstallFailed(self.command_line())
            })?;

        if !status.success() {
            return Err(GeneratorError::InstallFailed(self.command_line()).into());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TemplateDependencies {
    #[serde(default)]
    dependencies: Map<String, Value>,
}

/// The packages to install: the flex SDK plus the template's own list.
///
/// The template dependency file is consumed and removed.
pub fn collect_packages(svc_path: &Path) -> Result<Vec<String>> {
    let mut packages = vec![FLEX_SDK.to_string()];

    let path = svc_path.join(TEMPLATE_DEPENDENCIES);
    if path.is_file() {
        let text = std::fs::read_to_string(&path)?;
        let deps: TemplateDependencies =
            serde_json::from_str(&text).map_err(|e| GeneratorError::InvalidTemplateDependencies {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        packages.extend(
            deps.dependencies
                .into_iter()
                .map(|(name, version)| match version {
                    Value::String(version) => format!("{}@{}", name, version),
                    other => format!("{}@{}", name, other),
                }),
        );
        std::fs::remove_file(&path)?;
    }

    Ok(packages)
}
