//! GitHub CLI wrapper
//!
//! Remote repository provisioning and Actions secret storage via `gh`.
//! The secret value is piped over stdin so the credential never appears in
//! an argument list.

use crate::error::{RepoError, Result};
use shipflow_core::{CmdOutput, CmdSpec, CommandRunner};
use std::sync::Arc;

/// GitHub CLI wrapper
pub struct GitHub {
    runner: Arc<dyn CommandRunner>,
}

impl GitHub {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    async fn run(&self, spec: CmdSpec) -> Result<CmdOutput> {
        Ok(self.runner.run(&spec).await?)
    }

    async fn run_checked(&self, spec: CmdSpec) -> Result<CmdOutput> {
        let command = spec.display_line();
        let output = self.run(spec).await?;
        if !output.success() {
            return Err(RepoError::CommandFailed {
                command,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }

    /// The login of the authenticated user, used as a prompt default.
    pub async fn current_user(&self) -> Result<Option<String>> {
        let output = self.run(CmdSpec::new("gh", &["api", "user"])).await?;
        if !output.success() {
            return Ok(None);
        }
        let value: serde_json::Value = match serde_json::from_str(&output.stdout) {
            Ok(v) => v,
            Err(_) => return Ok(None),
        };
        Ok(value["login"].as_str().map(|s| s.to_string()))
    }

    /// Whether `owner/name` already exists on the hosting side.
    pub async fn repo_exists(&self, slug: &str) -> Result<bool> {
        let output = self.run(CmdSpec::new("gh", &["repo", "view", slug])).await?;
        Ok(output.success())
    }

    /// Create a public repository. A name collision is surfaced as
    /// [`RepoError::RemoteConflict`].
    pub async fn repo_create(&self, slug: &str) -> Result<()> {
        let output = self
            .run(CmdSpec::new("gh", &["repo", "create", slug, "--public"]))
            .await?;
        if !output.success() {
            if output.stderr.to_lowercase().contains("already exists") {
                return Err(RepoError::RemoteConflict {
                    repo: slug.to_string(),
                    message: output.stderr,
                });
            }
            return Err(RepoError::CommandFailed {
                command: format!("gh repo create {slug}"),
                stderr: output.stderr,
            });
        }
        Ok(())
    }

    /// Delete the remote repository. Requires the `delete_repo` scope.
    pub async fn repo_delete(&self, slug: &str) -> Result<()> {
        self.run_checked(CmdSpec::new("gh", &["repo", "delete", slug, "--yes"]))
            .await?;
        Ok(())
    }

    /// Store an Actions secret, piping the value over stdin.
    pub async fn secret_set(&self, slug: &str, name: &str, value: &str) -> Result<()> {
        let spec = CmdSpec::new("gh", &["secret", "set", name, "--repo", slug])
            .with_stdin(value);
        self.run_checked(spec).await?;
        Ok(())
    }

    /// Clone URL for a slug.
    pub fn remote_url(slug: &str) -> String {
        format!("https://github.com/{slug}.git")
    }
}
