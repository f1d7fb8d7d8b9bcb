//! Init command implementation.

use crate::cli::InitArgs;
use crate::commands::utils;
use crate::error::{CliError, Result};
use crate::generator::{self, InitOptions};

/// Execute the init command.
///
/// `verbose` is forwarded to npm.
///
/// # Errors
///
/// Returns errors for a missing `package.json`, a missing template directory,
/// file write failures and failed installs.
pub async fn execute(args: InitArgs, verbose: bool) -> Result<()> {
    let original_dir = utils::get_cwd()?;
    let svc_path = match &args.path {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => original_dir.join(path),
        None => original_dir.clone(),
    };

    let svc_name = svc_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| CliError::InvalidArgument("Invalid directory name".to_string()))?;

    let options = InitOptions {
        svc_path,
        svc_name,
        original_dir,
        template: args.template,
        package_manager: args.package_manager.selected(),
        verbose,
        skip_install: args.skip_install,
    };
    generator::init(&options).await?;
    Ok(())
}
