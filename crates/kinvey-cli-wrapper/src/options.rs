//! Per-command option payload and its translation to CLI environment variables.
//!
//! The Kinvey CLI reads most of its arguments from `KINVEY_CLI_*` variables,
//! which avoids quoting problems with secrets passed on the command line.

use crate::context::CliContext;
use std::collections::BTreeMap;

/// Options for a single CLI invocation.
///
/// Only fields that are set produce environment variables. Empty strings are
/// treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    pub email: Option<String>,
    pub password: Option<String>,
    pub instance_id: Option<String>,
    pub two_fa: Option<String>,
    pub profile: Option<String>,
    pub no_prompt: bool,
    pub org: Option<String>,
    pub app: Option<String>,
    pub env: Option<String>,
    pub domain: Option<String>,
    pub id: Option<String>,
    pub https_proxy: Option<String>,
    pub service: Option<String>,
    /// Text written to the child's stdin.
    pub input: Option<String>,
}

macro_rules! option_setters {
    ($($field:ident),* $(,)?) => {
        $(
            pub fn $field(mut self, value: impl Into<String>) -> Self {
                self.$field = Some(value.into());
                self
            }
        )*
    };
}

impl CommandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    option_setters!(
        email,
        password,
        instance_id,
        two_fa,
        profile,
        org,
        app,
        env,
        domain,
        id,
        https_proxy,
        service,
        input,
    );

    pub fn no_prompt(mut self, no_prompt: bool) -> Self {
        self.no_prompt = no_prompt;
        self
    }

    /// Builds the environment for one invocation.
    ///
    /// Output is always forced to uncolored JSON. `NODE_CONFIG` is added when
    /// the context carries a project or session directory.
    pub fn to_env(&self, context: &CliContext) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        env.insert("KINVEY_CLI_NO_COLOR".to_string(), "true".to_string());
        env.insert("KINVEY_CLI_OUTPUT".to_string(), "json".to_string());

        if self.no_prompt {
            env.insert("KINVEY_CLI_NO_PROMPT".to_string(), "true".to_string());
        }

        let pairs = [
            ("KINVEY_CLI_EMAIL", &self.email),
            ("KINVEY_CLI_PASSWORD", &self.password),
            ("KINVEY_CLI_INSTANCE_ID", &self.instance_id),
            ("KINVEY_CLI_2FA", &self.two_fa),
            ("KINVEY_CLI_PROFILE", &self.profile),
            ("KINVEY_CLI_ORG", &self.org),
            ("KINVEY_CLI_APP", &self.app),
            ("KINVEY_CLI_ENV", &self.env),
            ("KINVEY_CLI_DOMAIN", &self.domain),
            ("KINVEY_CLI_ID", &self.id),
            ("KINVEY_CLI_SERVICE", &self.service),
            ("HTTPS_PROXY", &self.https_proxy),
        ];
        for (key, value) in pairs {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                env.insert(key.to_string(), value.to_string());
            }
        }

        if let Some(node_config) = context.node_config() {
            env.insert("NODE_CONFIG".to_string(), node_config);
        }

        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_force_json_without_color() {
        let env = CommandOptions::new().to_env(&CliContext::new());

        assert_eq!(env.get("KINVEY_CLI_NO_COLOR").map(String::as_str), Some("true"));
        assert_eq!(env.get("KINVEY_CLI_OUTPUT").map(String::as_str), Some("json"));
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_no_prompt_only_when_requested() {
        let ctx = CliContext::new();
        assert!(!CommandOptions::new().to_env(&ctx).contains_key("KINVEY_CLI_NO_PROMPT"));

        let env = CommandOptions::new().no_prompt(true).to_env(&ctx);
        assert_eq!(env.get("KINVEY_CLI_NO_PROMPT").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_set_fields_map_to_variables() {
        let opts = CommandOptions::new()
            .email("dev@example.com")
            .password("hunter2")
            .two_fa("123456")
            .profile("staging")
            .service("svc-1")
            .https_proxy("http://proxy:3128");
        let env = opts.to_env(&CliContext::new());

        assert_eq!(env["KINVEY_CLI_EMAIL"], "dev@example.com");
        assert_eq!(env["KINVEY_CLI_PASSWORD"], "hunter2");
        assert_eq!(env["KINVEY_CLI_2FA"], "123456");
        assert_eq!(env["KINVEY_CLI_PROFILE"], "staging");
        assert_eq!(env["KINVEY_CLI_SERVICE"], "svc-1");
        assert_eq!(env["HTTPS_PROXY"], "http://proxy:3128");
        assert!(!env.contains_key("KINVEY_CLI_APP"));
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let env = CommandOptions::new().app("").to_env(&CliContext::new());
        assert!(!env.contains_key("KINVEY_CLI_APP"));
    }

    #[test]
    fn test_node_config_from_context() {
        let ctx = CliContext::new().with_project_dir("/svc");
        let env = CommandOptions::new().to_env(&ctx);
        assert!(env["NODE_CONFIG"].contains("/svc/.kinvey"));
    }

    #[test]
    fn test_input_is_not_an_env_var() {
        let env = CommandOptions::new()
            .input("\nsecret\n")
            .to_env(&CliContext::new());
        assert!(env.values().all(|v| !v.contains("secret")));
    }
}
