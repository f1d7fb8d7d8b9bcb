//! Shared utilities for command implementations.

use crate::error::{CliError, Result};
use crate::ui;
use std::path::{Path, PathBuf};

/// Get the current working directory.
///
/// # Errors
///
/// Returns I/O error if current directory cannot be determined.
pub fn get_cwd() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| {
        CliError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to get current directory: {}", e),
        ))
    })
}

/// Walks up the directory tree to find the nearest package.json.
///
/// Returns the directory containing it, or `None` at the filesystem root.
pub fn find_package_json(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        if current.join("package.json").is_file() {
            return Some(current.to_path_buf());
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Resolves the project root directory.
///
/// Resolution priority (highest to lowest):
/// 1. Explicit `--cwd` flag if provided
/// 2. Nearest package.json walking up from the current directory
/// 3. The current directory, with a warning
///
/// # Errors
///
/// Fails when the explicit directory does not exist or is not a directory.
pub fn resolve_project_root(explicit_cwd: Option<&Path>) -> Result<PathBuf> {
    let current_dir = get_cwd()?;

    if let Some(cwd_path) = explicit_cwd {
        let absolute = if cwd_path.is_absolute() {
            cwd_path.to_path_buf()
        } else {
            current_dir.join(cwd_path)
        };

        if !absolute.is_dir() {
            return Err(CliError::InvalidArgument(format!(
                "Specified --cwd is not a directory: {}",
                absolute.display()
            )));
        }

        tracing::debug!(root = %absolute.display(), "project root from --cwd");
        return Ok(absolute);
    }

    if let Some(package_root) = find_package_json(&current_dir) {
        tracing::debug!(root = %package_root.display(), "project root from package.json");
        return Ok(package_root);
    }

    ui::warning(&format!(
        "No package.json found. Using current directory: {}",
        current_dir.display()
    ));
    Ok(current_dir)
}

/// `version` field of `<dir>/package.json`, if readable.
pub fn package_version(dir: &Path) -> Option<String> {
    let text = std::fs::read_to_string(dir.join("package.json")).ok()?;
    let value: serde_json::Value = serde_json::from_str(&text).ok()?;
    value.get("version")?.as_str().map(str::to_string)
}
