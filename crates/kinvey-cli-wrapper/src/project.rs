//! The `.kinvey` project file.
//!
//! The file maps profile names to per-profile settings. Only the `flex`
//! namespace is managed here; anything else stored under a profile, and
//! every other profile, is carried through untouched.
//!
//! ```json
//! {
//!   "dev": {
//!     "flex": {
//!       "domain": "app",
//!       "domainEntityId": "kid_abc",
//!       "serviceId": "svc-1",
//!       "serviceName": "orders",
//!       "svcEnvId": "env-1",
//!       "schemaVersion": 3
//!     }
//!   }
//! }
//! ```

use crate::error::{Result, WrapperError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// File name of the project file inside a service directory.
pub const PROJECT_FILE: &str = ".kinvey";

/// Schema version written to every flex namespace.
pub const SCHEMA_VERSION: u32 = 3;

/// Where a flex service is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    App,
    Org,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::App => write!(f, "app"),
            Domain::Org => write!(f, "org"),
        }
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "app" => Ok(Domain::App),
            "org" => Ok(Domain::Org),
            other => Err(format!("unknown domain '{other}', expected 'app' or 'org'")),
        }
    }
}

/// Flex settings stored for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexNamespace {
    pub domain: Domain,
    pub domain_entity_id: String,
    pub service_id: String,
    pub service_name: String,
    #[serde(default)]
    pub svc_env_id: Option<String>,
    pub schema_version: u32,
}

/// In-memory copy of a `.kinvey` file.
#[derive(Debug, Clone)]
pub struct ProjectSetup {
    path: PathBuf,
    settings: Map<String, Value>,
}

impl ProjectSetup {
    /// Loads the project file from `dir`. A missing file yields empty settings.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(PROJECT_FILE);

        let settings = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| {
                WrapperError::InvalidProjectFile {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(source) => return Err(WrapperError::ProjectFile { path, source }),
        };

        Ok(Self { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(dir: &Path) -> bool {
        dir.join(PROJECT_FILE).is_file()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &str> {
        self.settings.keys().map(String::as_str)
    }

    /// The flex namespace for `profile`, if present and well formed.
    pub fn flex_namespace(&self, profile: &str) -> Option<FlexNamespace> {
        let flex = self.settings.get(profile)?.get("flex")?;
        serde_json::from_value(flex.clone()).ok()
    }

    /// Replaces the flex namespace for `profile`.
    pub fn set_flex_namespace(&mut self, profile: &str, namespace: &FlexNamespace) -> Result<()> {
        let value = serde_json::to_value(namespace)?;
        let entry = self
            .settings
            .entry(profile.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(profile_settings) = entry {
            profile_settings.insert("flex".to_string(), value);
        }
        Ok(())
    }

    /// Writes the settings back as pretty JSON.
    pub fn save(&self) -> Result<()> {
        let mut text = serde_json::to_string_pretty(&self.settings)?;
        text.push('\n');
        std::fs::write(&self.path, text).map_err(|source| WrapperError::ProjectFile {
            path: self.path.clone(),
            source,
        })
    }
}
