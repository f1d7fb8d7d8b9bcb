//! Turns a directory with a `package.json` into a flex service project.

mod install;
mod package_json;
mod template;

pub use install::{collect_packages, InstallPlan, PackageManager, FLEX_SDK, TEMPLATE_DEPENDENCIES};
pub use package_json::{apply_flex_scripts, minimal as minimal_package_json, DEFAULT_BROWSERS};
pub use template::{install_gitignore, TemplateSource};

use crate::error::Result;
use crate::ui;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings for one `init` run.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Service directory (must contain a `package.json`)
    pub svc_path: PathBuf,
    /// Display name of the service
    pub svc_name: String,
    /// Directory the command was run from
    pub original_dir: PathBuf,
    /// Custom template directory, relative to `original_dir`
    pub template: Option<PathBuf>,
    /// Forced package manager; detected from lock files when unset
    pub package_manager: Option<PackageManager>,
    pub verbose: bool,
    pub skip_install: bool,
}

/// What `init` changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub readme_renamed: bool,
    pub files: Vec<PathBuf>,
    pub package_manager: PackageManager,
    pub install: InstallPlan,
    pub installed: bool,
}

/// Runs every generation step in order.
///
/// # Errors
///
/// Stops at the first failing step. Files written by earlier steps stay.
pub async fn init(options: &InitOptions) -> Result<InitReport> {
    let svc_path = &options.svc_path;

    package_json::update(svc_path)?;
    debug!(path = %svc_path.display(), "updated package.json");

    let readme_renamed = rename_readme(svc_path)?;

    let source = TemplateSource::resolve(options.template.as_deref(), &options.original_dir);
    let files = source.copy_into(svc_path)?;
    debug!(count = files.len(), ?source, "copied template");

    install_gitignore(svc_path)?;

    let package_manager = options
        .package_manager
        .unwrap_or_else(|| PackageManager::detect(svc_path));
    let packages = collect_packages(svc_path)?;
    let install = InstallPlan::new(package_manager, options.verbose, &packages);

    let installed = if options.skip_install {
        ui::info(&format!("Skipping install. Run `{}` later.", install.command_line()));
        false
    } else {
        ui::info(&format!("Installing {} using {}...", FLEX_SDK, install.program));
        eprintln!();
        install.run(svc_path).await?;
        true
    };

    let report = InitReport {
        readme_renamed,
        files,
        package_manager,
        install,
        installed,
    };
    print_next_steps(options, &report);
    Ok(report)
}

/// Moves `README.md` aside so the template's readme can take its place.
fn rename_readme(svc_path: &Path) -> Result<bool> {
    let readme = svc_path.join("README.md");
    if !readme.exists() {
        return Ok(false);
    }
    std::fs::rename(&readme, svc_path.join("README.old.md"))?;
    Ok(true)
}

/// Shortest path the user can `cd` into.
fn cd_path(options: &InitOptions) -> String {
    if options.original_dir.join(&options.svc_name) == options.svc_path {
        options.svc_name.clone()
    } else {
        options.svc_path.display().to_string()
    }
}

fn print_next_steps(options: &InitOptions, report: &InitReport) {
    let pm = report.package_manager;

    eprintln!();
    ui::success(&format!(
        "Success! Created {} at {}",
        options.svc_name,
        options.svc_path.display()
    ));
    eprintln!("Inside that directory, you can run several commands:");
    eprintln!();
    ui::command(&format!("{} start", pm.command()));
    eprintln!("    Starts the development server.");
    eprintln!();
    ui::command(&pm.run_script("build"));
    eprintln!("    Bundles the service for production.");
    eprintln!();
    ui::command(&pm.run_script("deploy"));
    eprintln!("    Deploys the bundled service to Kinvey.");
    eprintln!();
    eprintln!("We suggest that you begin by typing:");
    eprintln!();
    ui::command(&format!("cd {}", cd_path(options)));
    ui::command(&format!("{} start", pm.command()));
    if report.readme_renamed {
        eprintln!();
        ui::warning("You had a `README.md` file, we renamed it to `README.old.md`");
    }
    eprintln!();
}
