//! The deployable `package.json` in the build directory.

use crate::error::DeployError;
use semver::Version;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Build manifest, kept as raw JSON so unknown keys and their order survive.
#[derive(Debug, Clone)]
pub struct BuildManifest {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl BuildManifest {
    pub const FILE_NAME: &'static str = "package.json";

    /// Reads `<build_dir>/package.json`.
    pub fn load(build_dir: &Path) -> Result<Self, DeployError> {
        let path = build_dir.join(Self::FILE_NAME);
        let text = std::fs::read_to_string(&path).map_err(|e| DeployError::Manifest {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(fields)) => Ok(Self { path, fields }),
            Ok(_) => Err(DeployError::Manifest {
                path,
                reason: "expected a JSON object".to_string(),
            }),
            Err(e) => Err(DeployError::Manifest {
                path,
                reason: e.to_string(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> Option<&str> {
        self.fields.get("version").and_then(Value::as_str)
    }

    pub fn set_version(&mut self, version: &Version) {
        self.fields
            .insert("version".to_string(), Value::String(version.to_string()));
    }

    /// Writes the manifest back as 2-space indented JSON with a trailing newline.
    pub fn save(&self) -> Result<(), DeployError> {
        let mut text = serde_json::to_string_pretty(&self.fields).map_err(|e| {
            DeployError::Manifest {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;
        text.push('\n');
        std::fs::write(&self.path, text).map_err(|e| DeployError::Manifest {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}
