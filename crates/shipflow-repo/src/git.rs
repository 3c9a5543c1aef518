//! git CLI wrapper
//!
//! Scoped to one working directory. Initialization is idempotent: an
//! existing `.git` is left alone and only the default branch is
//! normalized.

use crate::error::{RepoError, Result};
use shipflow_core::{CmdOutput, CmdSpec, CommandRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Branch every run standardizes on.
pub const DEFAULT_BRANCH: &str = "main";

/// git CLI wrapper bound to a working directory.
pub struct Git {
    runner: Arc<dyn CommandRunner>,
    work_dir: PathBuf,
}

impl Git {
    pub fn new(runner: Arc<dyn CommandRunner>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Whether the working directory already carries a repository marker.
    pub fn is_repo(&self) -> bool {
        self.work_dir.join(".git").exists()
    }

    async fn run(&self, args: &[&str]) -> Result<CmdOutput> {
        let spec = CmdSpec::new("git", args).with_cwd(&self.work_dir);
        Ok(self.runner.run(&spec).await?)
    }

    async fn run_checked(&self, args: &[&str]) -> Result<CmdOutput> {
        let output = self.run(args).await?;
        if !output.success() {
            return Err(RepoError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr: output.stderr,
            });
        }
        Ok(output)
    }

    pub async fn init(&self) -> Result<()> {
        self.run_checked(&["init"]).await?;
        Ok(())
    }

    /// Rename the current branch to [`DEFAULT_BRANCH`].
    pub async fn normalize_branch(&self) -> Result<()> {
        self.run_checked(&["branch", "-M", DEFAULT_BRANCH]).await?;
        Ok(())
    }

    /// Point `origin` at `url`, adding or updating as needed.
    pub async fn set_remote(&self, url: &str) -> Result<()> {
        let existing = self.run(&["remote", "get-url", "origin"]).await?;
        if existing.success() {
            self.run_checked(&["remote", "set-url", "origin", url]).await?;
        } else {
            self.run_checked(&["remote", "add", "origin", url]).await?;
        }
        Ok(())
    }

    /// Whether the working tree has anything to commit.
    pub async fn has_changes(&self) -> Result<bool> {
        let output = self.run_checked(&["status", "--porcelain"]).await?;
        Ok(!output.stdout.trim().is_empty())
    }

    pub async fn stage_all(&self) -> Result<()> {
        self.run_checked(&["add", "-A"]).await?;
        Ok(())
    }

    pub async fn commit(&self, message: &str) -> Result<()> {
        self.run_checked(&["commit", "-m", message]).await?;
        Ok(())
    }

    /// Push the default branch, setting the upstream.
    pub async fn push(&self) -> Result<()> {
        let output = self
            .run(&["push", "-u", "origin", DEFAULT_BRANCH])
            .await?;
        if !output.success() {
            return Err(RepoError::PushRejected {
                output: output.stderr,
            });
        }
        Ok(())
    }

    /// Remove the `.git` marker. Used during rollback, and only for
    /// repositories this run created.
    pub fn deinit(&self) -> Result<()> {
        let marker = self.work_dir.join(".git");
        if marker.exists() {
            std::fs::remove_dir_all(&marker)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingRunner {
        calls: Mutex<Vec<CmdSpec>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingRunner {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, spec: &CmdSpec) -> shipflow_core::Result<CmdOutput> {
            self.calls.lock().unwrap().push(spec.clone());
            let line = spec.display_line();
            let failed = self.fail_on.is_some_and(|m| line.contains(m));
            Ok(CmdOutput {
                code: Some(if failed { 1 } else { 0 }),
                stdout: String::new(),
                stderr: if failed {
                    "remote: rejected".to_string()
                } else {
                    String::new()
                },
            })
        }
    }

    #[tokio::test]
    async fn test_commands_run_in_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::new(None));
        let git = Git::new(runner.clone(), dir.path());

        git.init().await.unwrap();
        git.normalize_branch().await.unwrap();

        let calls = runner.calls.lock().unwrap();
        assert!(calls.iter().all(|c| c.cwd.as_deref() == Some(dir.path())));
        assert_eq!(calls[1].args, vec!["branch", "-M", "main"]);
    }

    #[tokio::test]
    async fn test_push_rejection_carries_output() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::new(Some("push")));
        let git = Git::new(runner, dir.path());

        let err = git.push().await.unwrap_err();
        match err {
            RepoError::PushRejected { output } => assert!(output.contains("rejected")),
            other => panic!("expected PushRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_is_repo_and_deinit() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::new(None));
        let git = Git::new(runner, dir.path());

        assert!(!git.is_repo());
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        assert!(git.is_repo());

        git.deinit().unwrap();
        assert!(!git.is_repo());
    }
}
