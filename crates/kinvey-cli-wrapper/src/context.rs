//! Per-wrapper invocation context.

use serde_json::json;
use std::path::{Path, PathBuf};

/// Name of the binary invoked when no other program is configured.
pub const DEFAULT_PROGRAM: &str = "kinvey";

/// Directories and program name shared by every invocation of one wrapper.
///
/// The project directory is where the `.kinvey` file and the `build`
/// package live. The session directory holds the CLI's `.kinvey-cli`
/// session store. When either is set the CLI is pointed at them through
/// `NODE_CONFIG`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliContext {
    pub program: String,
    pub project_dir: Option<PathBuf>,
    pub session_dir: Option<PathBuf>,
}

impl Default for CliContext {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            project_dir: None,
            session_dir: None,
        }
    }
}

impl CliContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(dir.into());
        self
    }

    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = Some(dir.into());
        self
    }

    /// Value of `NODE_CONFIG` for this context, if any directory is set.
    ///
    /// ```
    /// use kinvey_cli_wrapper::CliContext;
    ///
    /// let ctx = CliContext::new().with_project_dir("/app");
    /// let value: serde_json::Value =
    ///     serde_json::from_str(&ctx.node_config().unwrap()).unwrap();
    /// assert_eq!(value["paths"]["project"], "/app/.kinvey");
    /// assert_eq!(value["paths"]["package"], "/app/build");
    /// ```
    pub fn node_config(&self) -> Option<String> {
        if self.project_dir.is_none() && self.session_dir.is_none() {
            return None;
        }

        let mut paths = serde_json::Map::new();
        if let Some(project) = &self.project_dir {
            paths.insert("project".into(), json!(display(&project.join(".kinvey"))));
            paths.insert("package".into(), json!(display(&project.join("build"))));
        }
        if let Some(session) = &self.session_dir {
            paths.insert("session".into(), json!(display(&session.join(".kinvey-cli"))));
        }

        Some(json!({ "paths": paths }).to_string())
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
