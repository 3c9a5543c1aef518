//! az CLI wrapper
//!
//! Wraps the Azure CLI commands needed to stand up a web app: resource
//! group, App Service plan, web app, publish profile. Output is requested
//! as JSON wherever the command supports it; the publish profile is the
//! one XML surface.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use shipflow_core::{CmdSpec, CommandRunner};
use std::sync::Arc;

/// az CLI wrapper
pub struct AzCli {
    runner: Arc<dyn CommandRunner>,
}

impl AzCli {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Run an az command and return stdout.
    async fn run(&self, args: &[&str]) -> Result<String> {
        let spec = CmdSpec::new("az", args);
        let output = self.runner.run(&spec).await?;

        if !output.success() {
            return Err(CloudError::CommandFailed {
                command: spec.display_line(),
                stderr: output.stderr,
            });
        }

        Ok(output.stdout)
    }

    /// The signed-in account, for display and sanity checking.
    pub async fn account_show(&self) -> Result<AccountInfo> {
        let output = self.run(&["account", "show", "--output", "json"]).await?;
        let account: AccountInfo = serde_json::from_str(&output)?;
        Ok(account)
    }

    /// Create a resource group. Succeeds if it already exists.
    pub async fn group_create(&self, name: &str, location: &str) -> Result<()> {
        self.run(&[
            "group", "create", "--name", name, "--location", location, "--output", "json",
        ])
        .await?;
        Ok(())
    }

    /// Create a Linux App Service plan.
    pub async fn plan_create(&self, name: &str, resource_group: &str, sku: &str) -> Result<()> {
        self.run(&[
            "appservice",
            "plan",
            "create",
            "--name",
            name,
            "--resource-group",
            resource_group,
            "--sku",
            sku,
            "--is-linux",
            "--output",
            "json",
        ])
        .await?;
        Ok(())
    }

    /// Create the web app on an existing plan.
    pub async fn webapp_create(
        &self,
        name: &str,
        resource_group: &str,
        plan: &str,
        runtime: &str,
    ) -> Result<WebAppInfo> {
        let output = self
            .run(&[
                "webapp",
                "create",
                "--name",
                name,
                "--resource-group",
                resource_group,
                "--plan",
                plan,
                "--runtime",
                runtime,
                "--output",
                "json",
            ])
            .await?;

        let app: WebAppInfo = serde_json::from_str(&output)?;
        Ok(app)
    }

    /// Read back the web app, used for readiness polling.
    pub async fn webapp_show(&self, name: &str, resource_group: &str) -> Result<WebAppInfo> {
        let output = self
            .run(&[
                "webapp",
                "show",
                "--name",
                name,
                "--resource-group",
                resource_group,
                "--output",
                "json",
            ])
            .await?;

        let app: WebAppInfo = serde_json::from_str(&output)?;
        Ok(app)
    }

    /// Fetch the publish profile XML for the web app.
    pub async fn list_publishing_profiles(
        &self,
        name: &str,
        resource_group: &str,
    ) -> Result<String> {
        self.run(&[
            "webapp",
            "deployment",
            "list-publishing-profiles",
            "--name",
            name,
            "--resource-group",
            resource_group,
            "--xml",
        ])
        .await
    }

    /// Delete the resource group and everything in it. Deletion is
    /// asynchronous on the Azure side (`--no-wait`).
    pub async fn group_delete(&self, name: &str) -> Result<()> {
        self.run(&["group", "delete", "--name", name, "--yes", "--no-wait"])
            .await?;
        Ok(())
    }
}

/// Signed-in account from `az account show`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: String,
    pub name: String,
    pub user: Option<AccountUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountUser {
    pub name: String,
}

/// Web app information from `az webapp create`/`show`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebAppInfo {
    pub name: String,
    pub state: Option<String>,
    pub default_host_name: Option<String>,
}

impl WebAppInfo {
    /// App Service reports `Running` once the site is serving.
    pub fn is_running(&self) -> bool {
        self.state.as_deref() == Some("Running")
    }

    pub fn url(&self) -> Option<String> {
        self.default_host_name
            .as_ref()
            .map(|host| format!("https://{host}"))
    }
}

/// Fields extracted from a publish profile.
#[derive(Debug, Clone)]
pub struct PublishProfile {
    pub user_name: String,
    pub user_pwd: String,
    pub publish_url: String,
}

/// Extract the deployment credentials from publish profile XML.
///
/// The profile is stored verbatim as a secret; this parse only confirms the
/// XML actually carries a usable credential before it is propagated.
pub fn parse_publish_profile(xml: &str) -> Result<PublishProfile> {
    let attr = |key: &str| -> Option<String> {
        let re = regex::Regex::new(&format!(r#"{key}="([^"]*)""#)).ok()?;
        re.captures(xml).map(|caps| caps[1].to_string())
    };

    let field = |key: &str| -> Result<String> {
        attr(key).filter(|v| !v.is_empty()).ok_or_else(|| {
            CloudError::UnexpectedOutput(format!("publish profile missing {key}"))
        })
    };

    Ok(PublishProfile {
        user_name: field("userName")?,
        user_pwd: field("userPWD")?,
        publish_url: field("publishUrl")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PROFILE: &str = r#"<publishData>
  <publishProfile profileName="app1 - Web Deploy" publishMethod="MSDeploy" publishUrl="app1.scm.azurewebsites.net:443" userName="$app1" userPWD="s3cretpw" destinationAppUrl="https://app1.azurewebsites.net" />
  <publishProfile profileName="app1 - FTP" publishMethod="FTP" publishUrl="ftps://waws-prod.ftp.azurewebsites.windows.net/site/wwwroot" userName="app1\$app1" userPWD="s3cretpw" />
</publishData>"#;

    #[test]
    fn test_parse_publish_profile() {
        let profile = parse_publish_profile(SAMPLE_PROFILE).unwrap();

        assert_eq!(profile.user_name, "$app1");
        assert_eq!(profile.user_pwd, "s3cretpw");
        assert_eq!(profile.publish_url, "app1.scm.azurewebsites.net:443");
    }

    #[test]
    fn test_parse_publish_profile_missing_credential() {
        let err = parse_publish_profile("<publishData></publishData>").unwrap_err();
        assert!(err.to_string().contains("userName"));
    }

    #[test]
    fn test_webapp_info_state() {
        let app: WebAppInfo = serde_json::from_str(
            r#"{"name": "app1", "state": "Running", "defaultHostName": "app1.azurewebsites.net"}"#,
        )
        .unwrap();

        assert!(app.is_running());
        assert_eq!(app.url(), Some("https://app1.azurewebsites.net".to_string()));
    }

    #[test]
    fn test_account_info_parses() {
        let account: AccountInfo = serde_json::from_str(
            r#"{"id": "0000-1111", "name": "Pay-As-You-Go", "user": {"name": "dev@example.com", "type": "user"}}"#,
        )
        .unwrap();

        assert_eq!(account.user.unwrap().name, "dev@example.com");
    }
}
