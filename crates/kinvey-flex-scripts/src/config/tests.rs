#[cfg(test)]
mod tests {
    use crate::config::*;
    use serial_test::serial;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn clear_env() {
        for key in ["PORT", "HOST", "FLEX_SCRIPTS_FLEX_URL", "FLEX_SCRIPTS_PORT"] {
            unsafe { std::env::remove_var(key); }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let config = ScriptsConfig::load(dir.path(), None, &ConfigOverrides::default()).unwrap();

        assert_eq!(config, ScriptsConfig::default());
        assert_eq!(config.port, 9999);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.flex_url, "http://localhost:10001");
        assert_eq!(config.entry, PathBuf::from("src/index.js"));
    }

    #[test]
    #[serial]
    fn test_layer_priority() {
        clear_env();
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"port": 7000, "bundle": "out/service.js", "build_command": "npm run watch"}"#,
        )
        .unwrap();
        let env_file = EnvFile::parse("PORT=7100\nHOST=127.0.0.1").unwrap();

        let config = ScriptsConfig::load(dir.path(), Some(&env_file), &ConfigOverrides::default())
            .unwrap();
        assert_eq!(config.port, 7100);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.bundle, Path::new("out/service.js"));
        assert_eq!(config.build_command.as_deref(), Some("npm run watch"));

        unsafe { std::env::set_var("PORT", "7200"); }
        let config = ScriptsConfig::load(dir.path(), Some(&env_file), &ConfigOverrides::default())
            .unwrap();
        assert_eq!(config.port, 7200);

        let overrides = ConfigOverrides {
            port: Some(7300),
            ..Default::default()
        };
        let config = ScriptsConfig::load(dir.path(), Some(&env_file), &overrides).unwrap();
        assert_eq!(config.port, 7300);
        assert_eq!(config.host, "127.0.0.1");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_prefixed_env() {
        clear_env();
        let dir = TempDir::new().unwrap();
        unsafe { std::env::set_var("FLEX_SCRIPTS_FLEX_URL", "http://127.0.0.1:12001"); }

        let config = ScriptsConfig::load(dir.path(), None, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.flex_url, "http://127.0.0.1:12001");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_config_error() {
        clear_env();
        let dir = TempDir::new().unwrap();
        unsafe { std::env::set_var("PORT", "not-a-port"); }

        let err = ScriptsConfig::load(dir.path(), None, &ConfigOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("Configuration error"));

        clear_env();
    }
}
