//! Platform variables consumed by the dev proxy.

use super::EnvFile;

/// Kinvey app credentials and request context for the local service.
///
/// Empty values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlexEnvironment {
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub master_secret: Option<String>,
    pub baas_url: Option<String>,
    pub api_version: Option<String>,
    pub auth_header: Option<String>,
    pub user_name: Option<String>,
    pub user_id: Option<String>,
    pub shared_secret: Option<String>,
}

impl FlexEnvironment {
    /// Reads the process environment, falling back to `env_file`.
    pub fn load(env_file: Option<&EnvFile>) -> Self {
        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| env_file.and_then(|f| f.get(key)).map(str::to_string))
        })
    }

    /// Builds the environment from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            app_id: get("KINVEY_APP_ID"),
            app_secret: get("KINVEY_APP_SECRET"),
            master_secret: get("KINVEY_MASTER_SECRET"),
            baas_url: get("KINVEY_BAAS_URL"),
            api_version: get("KINVEY_API_VERSION"),
            auth_header: get("KINVEY_AUTH_HEADER"),
            user_name: get("KINVEY_USER_NAME"),
            user_id: get("KINVEY_USER_ID"),
            shared_secret: get("FLEX_SHARED_SECRET"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup_skips_empty() {
        let vars: HashMap<&str, &str> = [
            ("KINVEY_APP_ID", "kid_1"),
            ("KINVEY_AUTH_HEADER", ""),
            ("FLEX_SHARED_SECRET", "shh"),
        ]
        .into_iter()
        .collect();

        let env = FlexEnvironment::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(env.app_id.as_deref(), Some("kid_1"));
        assert_eq!(env.auth_header, None);
        assert_eq!(env.shared_secret.as_deref(), Some("shh"));
    }

    #[test]
    #[serial]
    fn test_process_env_wins_over_file() {
        let file = EnvFile::parse("KINVEY_USER_ID=from-file\nKINVEY_USER_NAME=file-user").unwrap();
        unsafe { std::env::set_var("KINVEY_USER_ID", "from-process"); }
        unsafe { std::env::remove_var("KINVEY_USER_NAME"); }

        let env = FlexEnvironment::load(Some(&file));
        assert_eq!(env.user_id.as_deref(), Some("from-process"));
        assert_eq!(env.user_name.as_deref(), Some("file-user"));

        unsafe { std::env::remove_var("KINVEY_USER_ID"); }
    }
}
