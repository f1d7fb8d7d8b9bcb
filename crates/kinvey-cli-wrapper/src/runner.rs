//! Process execution seam.
//!
//! [`CommandRunner`] is the only place the wrapper touches the operating
//! system. [`ProcessRunner`] spawns real processes; tests substitute a
//! scripted runner.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// A fully resolved CLI call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Variables added on top of the inherited environment.
    pub env: BTreeMap<String, String>,
    pub input: Option<String>,
}

impl Invocation {
    /// Space-joined arguments, used for logging and error messages.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RawOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            status: Some(1),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Executes CLI invocations.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<RawOutput>;
}

/// Runs invocations as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<RawOutput> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(&invocation.env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if invocation.input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = command.spawn()?;

        if let Some(input) = &invocation.input {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(input.as_bytes()).await?;
                stdin.shutdown().await?;
            }
        }

        let output = child.wait_with_output().await?;

        Ok(RawOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
