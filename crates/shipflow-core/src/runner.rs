//! External command execution
//!
//! Every `git`, `gh` and `az` invocation goes through the [`CommandRunner`]
//! trait so that the wrappers built on top of it can be exercised against a
//! scripted runner in tests.

use crate::error::{CoreError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// A fully described external command invocation.
#[derive(Debug, Clone, Default)]
pub struct CmdSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub stdin: Option<String>,
}

impl CmdSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: None,
            stdin: None,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// The command line as it would appear in a shell, for logging.
    pub fn display_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Abstraction over subprocess execution.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion and capture its output.
    ///
    /// An `Err` means the process could not be run at all; a non-zero exit
    /// is reported through [`CmdOutput::code`], not as an error.
    async fn run(&self, spec: &CmdSpec) -> Result<CmdOutput>;
}

/// Runs commands as real subprocesses via [`tokio::process`].
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, spec: &CmdSpec) -> Result<CmdOutput> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        tracing::debug!("Running: {}", spec.display_line());

        let spawn_err = |e: std::io::Error| CoreError::Spawn {
            program: spec.program.clone(),
            message: e.to_string(),
        };

        let mut child = cmd.spawn().map_err(spawn_err)?;

        if let Some(input) = &spec.stdin
            && let Some(mut pipe) = child.stdin.take()
        {
            pipe.write_all(input.as_bytes()).await.map_err(spawn_err)?;
            // Dropping the pipe closes stdin so the child sees EOF.
            drop(pipe);
        }

        let output = child.wait_with_output().await.map_err(spawn_err)?;

        Ok(CmdOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shell_runner_captures_stdout() {
        let runner = ShellRunner;
        let output = runner
            .run(&CmdSpec::new("echo", &["hello"]))
            .await
            .unwrap();

        assert!(output.success());
        assert!(output.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_shell_runner_missing_program() {
        let runner = ShellRunner;
        let result = runner
            .run(&CmdSpec::new("nonexistent-command-54321", &[]))
            .await;

        assert!(matches!(result, Err(CoreError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_shell_runner_pipes_stdin() {
        let runner = ShellRunner;
        let output = runner
            .run(&CmdSpec::new("cat", &[]).with_stdin("piped content"))
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, "piped content");
    }

    #[test]
    fn test_display_line() {
        let spec = CmdSpec::new("az", &["group", "create", "--name", "rg1"]);
        assert_eq!(spec.display_line(), "az group create --name rg1");
    }
}
