//! Template sources for new services.

use crate::error::{GeneratorError, Result};
use rust_embed::RustEmbed;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(RustEmbed)]
#[folder = "template/"]
struct BuiltinTemplate;

/// Where template files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Compiled into the binary
    Builtin,
    /// A directory on disk
    Directory(PathBuf),
}

impl TemplateSource {
    /// `--template` resolved against the directory the command was run from.
    pub fn resolve(template: Option<&Path>, original_dir: &Path) -> Self {
        match template {
            Some(dir) if dir.is_absolute() => TemplateSource::Directory(dir.to_path_buf()),
            Some(dir) => TemplateSource::Directory(original_dir.join(dir)),
            None => TemplateSource::Builtin,
        }
    }

    /// Copies every template file into `target`, overwriting existing files.
    ///
    /// Returns the copied paths relative to `target`.
    pub fn copy_into(&self, target: &Path) -> Result<Vec<PathBuf>> {
        match self {
            TemplateSource::Builtin => copy_builtin(target),
            TemplateSource::Directory(dir) => copy_dir(dir, target),
        }
    }
}

fn copy_builtin(target: &Path) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    for name in BuiltinTemplate::iter() {
        let Some(file) = BuiltinTemplate::get(&name) else {
            continue;
        };
        let relative = PathBuf::from(name.as_ref());
        write_file(&target.join(&relative), &file.data)?;
        copied.push(relative);
    }
    Ok(copied)
}

fn copy_dir(dir: &Path, target: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(GeneratorError::TemplateNotFound(dir.to_path_buf()).into());
    }

    let mut copied = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let data = fs::read(entry.path())?;
        write_file(&target.join(relative), &data)?;
        copied.push(relative.to_path_buf());
    }
    Ok(copied)
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)?;
    Ok(())
}

/// Moves `gitignore` to `.gitignore`, appending when `.gitignore` exists.
///
/// Templates ship the file without the dot so package managers keep it.
/// Returns whether a `gitignore` was present.
pub fn install_gitignore(svc_path: &Path) -> Result<bool> {
    let source = svc_path.join("gitignore");
    if !source.is_file() {
        return Ok(false);
    }

    let target = svc_path.join(".gitignore");
    if target.exists() {
        let data = fs::read(&source)?;
        let mut existing = fs::read(&target)?;
        existing.extend_from_slice(&data);
        fs::write(&target, existing)?;
        fs::remove_file(&source)?;
    } else {
        fs::rename(&source, &target)?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_template_contents() {
        let dir = TempDir::new().unwrap();
        let copied = TemplateSource::Builtin.copy_into(dir.path()).unwrap();

        assert!(copied.contains(&PathBuf::from("src/index.js")));
        assert!(copied.contains(&PathBuf::from("gitignore")));
        let index = fs::read_to_string(dir.path().join("src/index.js")).unwrap();
        assert!(index.contains("firstFunction"));
    }

    #[test]
    fn test_resolve_relative_to_original_dir() {
        let source = TemplateSource::resolve(Some(Path::new("tpl")), Path::new("/work"));
        assert_eq!(source, TemplateSource::Directory(PathBuf::from("/work/tpl")));
        assert_eq!(TemplateSource::resolve(None, Path::new("/work")), TemplateSource::Builtin);
    }

    #[test]
    fn test_missing_directory_template() {
        let dir = TempDir::new().unwrap();
        let source = TemplateSource::Directory(dir.path().join("missing"));
        let err = source.copy_into(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Could not locate supplied template"));
    }

    #[test]
    fn test_gitignore_rename() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("gitignore"), "/node_modules\n").unwrap();

        assert!(install_gitignore(dir.path()).unwrap());
        assert!(!dir.path().join("gitignore").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
            "/node_modules\n"
        );
    }

    #[test]
    fn test_gitignore_merge() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "secrets/\n").unwrap();
        fs::write(dir.path().join("gitignore"), "/node_modules\n").unwrap();

        install_gitignore(dir.path()).unwrap();
        assert!(!dir.path().join("gitignore").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
            "secrets/\n/node_modules\n"
        );
    }

    #[test]
    fn test_gitignore_absent() {
        let dir = TempDir::new().unwrap();
        assert!(!install_gitignore(dir.path()).unwrap());
    }
}
