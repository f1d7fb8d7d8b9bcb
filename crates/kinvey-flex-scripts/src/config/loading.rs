use crate::config::{EnvFile, ScriptsConfig, CONFIG_FILE};
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    value::{Dict, Value},
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Settings given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,
}

/// Keys a `.env` file may set for the tooling itself.
const ENV_FILE_KEYS: &[(&str, &str)] = &[("PORT", "port"), ("HOST", "host")];

impl ScriptsConfig {
    /// Load configuration for the project at `project_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a layer holds a value of the
    /// wrong type, e.g. a non-numeric `PORT`.
    pub fn load(
        project_dir: &Path,
        env_file: Option<&EnvFile>,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        Self::figment(project_dir, env_file, overrides)
            .extract()
            .map_err(|e| {
                ConfigError::InvalidValue {
                    field: "configuration".to_string(),
                    value: e.to_string(),
                    hint: format!("Check {} and the PORT/HOST variables", CONFIG_FILE),
                }
                .into()
            })
    }

    fn figment(
        project_dir: &Path,
        env_file: Option<&EnvFile>,
        overrides: &ConfigOverrides,
    ) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(ScriptsConfig::default()));

        let config_file = project_dir.join(CONFIG_FILE);
        if config_file.is_file() {
            figment = figment.merge(Json::file(config_file));
        }

        if let Some(env_file) = env_file {
            figment = figment.merge(Serialized::defaults(env_file_layer(env_file)));
        }

        figment
            .merge(Env::prefixed("FLEX_SCRIPTS_"))
            .merge(Env::raw().only(&["PORT", "HOST"]))
            .merge(Serialized::defaults(overrides))
    }
}

fn env_file_layer(env_file: &EnvFile) -> Dict {
    let mut dict = Dict::new();
    for (var, key) in ENV_FILE_KEYS {
        if let Some(raw) = env_file.get(var).filter(|v| !v.is_empty()) {
            let value = match raw.parse::<Value>() {
                Ok(value) => value,
                Err(never) => match never {},
            };
            dict.insert(key.to_string(), value);
        }
    }
    dict
}
