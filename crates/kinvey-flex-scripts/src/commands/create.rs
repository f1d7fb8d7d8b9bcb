//! Create command implementation.
//!
//! Creates the service directory with a minimal `package.json`, then hands
//! over to the same steps as `init`.

use crate::cli::CreateArgs;
use crate::commands::utils;
use crate::error::{GeneratorError, Result};
use crate::generator::{self, minimal_package_json, InitOptions};
use crate::ui;
use std::fs;
use std::path::{Path, PathBuf};

/// Execute the create command.
///
/// # Errors
///
/// Returns [`GeneratorError::DirectoryExists`] when the target exists, plus
/// any error from the init steps.
pub async fn execute(args: CreateArgs, verbose: bool) -> Result<()> {
    let original_dir = utils::get_cwd()?;
    let svc_path = create_service_dir(&original_dir, &args.name)?;

    ui::info(&format!(
        "Creating a new Kinvey Flex service in {}",
        svc_path.display()
    ));

    let options = InitOptions {
        svc_name: dir_name(&args.name).to_string(),
        svc_path,
        original_dir,
        template: args.template,
        package_manager: args.package_manager.selected(),
        verbose,
        skip_install: args.skip_install,
    };
    generator::init(&options).await?;
    Ok(())
}

/// Scoped names (`@scope/name`) use the bare name as directory.
fn dir_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Makes `<parent>/<name>` with a minimal `package.json`.
pub fn create_service_dir(parent: &Path, name: &str) -> Result<PathBuf> {
    let svc_path = parent.join(dir_name(name));
    if svc_path.exists() {
        return Err(GeneratorError::DirectoryExists(svc_path).into());
    }

    fs::create_dir_all(&svc_path)?;
    let manifest = serde_json::to_string_pretty(&minimal_package_json(name))?;
    fs::write(svc_path.join("package.json"), format!("{}\n", manifest))?;
    Ok(svc_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_service_dir() {
        let dir = TempDir::new().unwrap();
        let svc = create_service_dir(dir.path(), "orders").unwrap();

        assert_eq!(svc, dir.path().join("orders"));
        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(svc.join("package.json")).unwrap()).unwrap();
        assert_eq!(manifest["name"], "orders");
        assert_eq!(manifest["private"], true);
    }

    #[test]
    fn test_existing_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("orders")).unwrap();

        let err = create_service_dir(dir.path(), "orders").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_scoped_name_directory() {
        assert_eq!(dir_name("@acme/orders"), "orders");
        assert_eq!(dir_name("orders"), "orders");
    }
}
