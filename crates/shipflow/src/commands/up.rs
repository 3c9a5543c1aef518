use crate::{pipeline, prompt};
use colored::Colorize;
use shipflow_core::{CommandRunner, RunParams, ShellRunner, app_name_from_dir};
use shipflow_repo::GitHub;
use std::sync::Arc;

#[allow(clippy::too_many_arguments)]
pub async fn handle(
    app_name: Option<String>,
    user: Option<String>,
    resource_group: Option<String>,
    location: Option<String>,
    plan: Option<String>,
    yes: bool,
) -> anyhow::Result<()> {
    let runner: Arc<dyn CommandRunner> = Arc::new(ShellRunner);
    let root = std::env::current_dir()?;

    let params = collect_params(
        runner.clone(),
        &root,
        app_name,
        user,
        resource_group,
        location,
        plan,
        yes,
    )
    .await?;

    println!();
    println!("{}", "Plan:".bold());
    println!("  repository      {}", params.repo_slug().cyan());
    println!("  resource group  {}", params.resource_group.cyan());
    println!("  location        {}", params.location.cyan());
    println!("  plan            {} ({})", params.plan_name.cyan(), params.sku);
    println!("  web app         {} ({})", params.app_name.cyan(), params.runtime);

    if !yes && !prompt::confirm("Create these resources?")? {
        println!("{}", "Cancelled.".yellow());
        return Ok(());
    }

    println!();
    println!(
        "{} {}",
        "Started at".dimmed(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let summary = pipeline::execute(runner, &root, &params).await?;

    println!();
    println!(
        "{}",
        format!("✓ '{}' is live!", params.app_name).green().bold()
    );
    if let Some(url) = &summary.app_url {
        println!("  app   {}", url.cyan());
    }
    println!(
        "  repo  {}",
        format!("https://github.com/{}", summary.repo_slug).cyan()
    );
    println!(
        "  took  {}",
        format!("{:.0?}", summary.elapsed).dimmed()
    );
    Ok(())
}

/// Resolve parameters from flags, the environment and prompts, in that
/// order. With `--yes`, unset values take their defaults silently.
#[allow(clippy::too_many_arguments)]
async fn collect_params(
    runner: Arc<dyn CommandRunner>,
    root: &std::path::Path,
    app_name: Option<String>,
    user: Option<String>,
    resource_group: Option<String>,
    location: Option<String>,
    plan: Option<String>,
    yes: bool,
) -> anyhow::Result<RunParams> {
    let default_app = app_name
        .or_else(|| app_name_from_dir(root))
        .unwrap_or_else(|| "fastapi-app".to_string());

    let default_user = match user {
        Some(u) => u,
        None => {
            // The signed-in gh account is the natural owner.
            let hub = GitHub::new(runner.clone());
            hub.current_user().await.ok().flatten().unwrap_or_default()
        }
    };

    let (username, app) = if yes {
        anyhow::ensure!(
            !default_user.is_empty(),
            "no GitHub username given and none could be detected; pass --user"
        );
        (default_user, default_app)
    } else {
        (
            prompt::text("GitHub username", &default_user)?,
            prompt::text("App name", &default_app)?,
        )
    };

    let mut params = RunParams::new(username, app);

    match resource_group {
        Some(rg) => params.resource_group = rg,
        None if !yes => {
            params.resource_group = prompt::text("Resource group", &params.resource_group)?;
        }
        None => {}
    }
    match location {
        Some(loc) => params.location = loc,
        None if !yes => {
            params.location = prompt::text("Location", &params.location)?;
        }
        None => {}
    }
    match plan {
        Some(p) => params.plan_name = p,
        None if !yes => {
            params.plan_name = prompt::text("App Service plan", &params.plan_name)?;
        }
        None => {}
    }

    params.validate()?;
    Ok(params)
}
