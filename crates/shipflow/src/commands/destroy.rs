use crate::prompt;
use colored::Colorize;
use shipflow_cloud::{AzCli, Provisioner};
use shipflow_core::{CommandRunner, RunParams, ShellRunner, app_name_from_dir};
use shipflow_repo::{Git, GitHub};
use std::sync::Arc;

/// Tear down everything a previous run may have left behind: the resource
/// group, the remote repository and the local `.git` marker. Each step is
/// best-effort; failures are reported and skipped.
pub async fn handle(
    app_name: Option<String>,
    user: Option<String>,
    resource_group: Option<String>,
    yes: bool,
) -> anyhow::Result<()> {
    let runner: Arc<dyn CommandRunner> = Arc::new(ShellRunner);
    let root = std::env::current_dir()?;

    let app_name = app_name
        .or_else(|| app_name_from_dir(&root))
        .ok_or_else(|| anyhow::anyhow!("could not derive an app name, pass one explicitly"))?;

    let hub = GitHub::new(runner.clone());
    let username = match user {
        Some(u) => u,
        None => hub
            .current_user()
            .await
            .ok()
            .flatten()
            .ok_or_else(|| anyhow::anyhow!("no GitHub username given; pass --user"))?,
    };

    let mut params = RunParams::new(username, app_name);
    if let Some(rg) = resource_group {
        params.resource_group = rg;
    }
    params.validate()?;
    let slug = params.repo_slug();

    println!("{}", "⚠ This will delete:".red().bold());
    println!("  resource group  {} (and everything in it)", params.resource_group.cyan());
    println!("  repository      {}", slug.cyan());
    println!("  local marker    .git");
    if !yes && !prompt::confirm("Proceed?")? {
        println!("{}", "Cancelled.".yellow());
        return Ok(());
    }

    let provisioner = Provisioner::new(AzCli::new(runner.clone()));
    match provisioner.destroy(&params.resource_group).await {
        Ok(()) => println!(
            "  {} requested deletion of resource group {}",
            "✓".green(),
            params.resource_group
        ),
        Err(e) => println!("  {} resource group: {}", "⚠".yellow(), e),
    }

    match hub.repo_delete(&slug).await {
        Ok(()) => println!("  {} deleted repository {}", "✓".green(), slug),
        Err(e) => println!("  {} repository: {}", "⚠".yellow(), e),
    }

    let git = Git::new(runner, &root);
    if git.is_repo() {
        match git.deinit() {
            Ok(()) => println!("  {} removed .git", "✓".green()),
            Err(e) => println!("  {} .git: {}", "⚠".yellow(), e),
        }
    }

    println!();
    println!("{}", "✓ Teardown requested".green().bold());
    Ok(())
}
