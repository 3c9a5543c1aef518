//! The bootstrap pipeline
//!
//! Runs the whole `ship up` flow strictly top to bottom: prerequisites,
//! local repository, scaffold, remote repository, cloud resources, publish
//! profile secret, first push. Remote state is never touched before the
//! local scaffold has been generated and verified.
//!
//! Rollback is scoped to what the failing run itself created: the resource
//! group, the remote repository if this run made it, and the `.git` marker
//! if this run initialized it. Each teardown step is independently guarded
//! so one failure never blocks the rest.

use crate::preflight;
use colored::Colorize;
use shipflow_cloud::{AzCli, CloudError, Provisioner};
use shipflow_core::{
    CommandRunner, PUBLISH_PROFILE_SECRET, RunParams, RunPhase, scaffold,
};
use shipflow_repo::{Git, GitHub, RepoError};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const COMMIT_MESSAGE: &str = "Initial scaffold";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] shipflow_core::CoreError),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// State this run created, i.e. the rollback scope.
#[derive(Debug, Default)]
struct CreatedState {
    git_dir: bool,
    remote_repo: Option<String>,
    resource_group: Option<String>,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub app_url: Option<String>,
    pub repo_slug: String,
    pub phase: RunPhase,
    pub elapsed: Duration,
}

/// Timing knobs for the cloud stages.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub retry: shipflow_cloud::RetryConfig,
    pub readiness_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry: shipflow_cloud::RetryConfig::default(),
            readiness_timeout: Duration::from_secs(300),
        }
    }
}

/// Run the full pipeline; on failure, roll back created state and return
/// the original error.
pub async fn execute(
    runner: Arc<dyn CommandRunner>,
    root: &Path,
    params: &RunParams,
) -> Result<RunSummary, PipelineError> {
    execute_with(runner, root, params, PipelineConfig::default()).await
}

pub async fn execute_with(
    runner: Arc<dyn CommandRunner>,
    root: &Path,
    params: &RunParams,
    config: PipelineConfig,
) -> Result<RunSummary, PipelineError> {
    params.validate()?;

    let mut created = CreatedState::default();
    match run_stages(runner.clone(), root, params, &config, &mut created).await {
        Ok(summary) => Ok(summary),
        Err(e) => {
            eprintln!();
            eprintln!("{} {}", "✗".red().bold(), e.to_string().red());
            rollback(runner, root, &created).await;
            enter(RunPhase::Aborted);
            Err(e)
        }
    }
}

async fn run_stages(
    runner: Arc<dyn CommandRunner>,
    root: &Path,
    params: &RunParams,
    config: &PipelineConfig,
    created: &mut CreatedState,
) -> Result<RunSummary, PipelineError> {
    let started = std::time::Instant::now();
    enter(RunPhase::Start);

    // 1. Prerequisites — nothing exists yet, fail fast.
    step("Checking prerequisites");
    let tools = preflight::check_tools(runner.as_ref()).await?;
    for tool in &tools {
        println!("  {} {} {}", "✓".green(), tool.name, tool.version_line.dimmed());
    }
    enter(RunPhase::PrereqsOk);

    // 2. Local repository.
    step("Preparing local repository");
    let git = Git::new(runner.clone(), root);
    if git.is_repo() {
        println!("  {} repository already initialized", "✓".green());
    } else {
        git.init().await?;
        created.git_dir = true;
        println!("  {} initialized repository", "✓".green());
    }
    git.normalize_branch().await?;
    enter(RunPhase::RepoReady);

    // 3. Scaffold, verified before any remote state is touched.
    step("Writing scaffold");
    let report = scaffold::generate(root, params)?;
    scaffold::verify(root)?;
    for path in &report.written {
        println!("  {} {}", "✓".green(), path.display());
    }
    for path in &report.skipped {
        println!("  {} {} (kept)", "•".dimmed(), path.display());
    }
    enter(RunPhase::ScaffoldWritten);

    // 4. Remote repository.
    step("Provisioning GitHub repository");
    let hub = GitHub::new(runner.clone());
    let slug = params.repo_slug();
    if hub.repo_exists(&slug).await? {
        println!("  {} {} already exists, reusing", "✓".green(), slug.cyan());
    } else {
        hub.repo_create(&slug).await?;
        created.remote_repo = Some(slug.clone());
        println!("  {} created {}", "✓".green(), slug.cyan());
    }
    git.set_remote(&GitHub::remote_url(&slug)).await?;

    // 5. Cloud resources: group → plan → web app.
    step("Provisioning Azure resources");
    let mut provisioner = Provisioner::new(AzCli::new(runner.clone()));
    provisioner.retry = config.retry.clone();
    provisioner.readiness_timeout = config.readiness_timeout;
    created.resource_group = Some(params.resource_group.clone());
    let app = provisioner.provision(params).await?;
    println!(
        "  {} resource group {} / plan {} / app {}",
        "✓".green(),
        params.resource_group.cyan(),
        params.plan_name.cyan(),
        params.app_name.cyan()
    );
    enter(RunPhase::CloudProvisioned);

    // 6. Publish profile → Actions secret.
    step("Wiring deployment secret");
    provisioner
        .wait_until_ready(&params.app_name, &params.resource_group)
        .await?;
    let profile = provisioner
        .fetch_publish_profile(&params.app_name, &params.resource_group)
        .await?;
    hub.secret_set(&slug, PUBLISH_PROFILE_SECRET, &profile).await?;
    println!("  {} secret {} set", "✓".green(), PUBLISH_PROFILE_SECRET);
    enter(RunPhase::SecretSet);

    // 7. Commit and push, triggering the first deployment.
    step("Pushing scaffold");
    git.stage_all().await?;
    if git.has_changes().await? {
        git.commit(COMMIT_MESSAGE).await?;
        println!("  {} committed", "✓".green());
    } else {
        println!("  {} nothing to commit", "•".dimmed());
    }
    git.push().await?;
    println!("  {} pushed to {}", "✓".green(), slug.cyan());
    enter(RunPhase::Pushed);

    enter(RunPhase::Done);
    Ok(RunSummary {
        app_url: app.url,
        repo_slug: slug,
        phase: RunPhase::Done,
        elapsed: started.elapsed(),
    })
}

/// Best-effort teardown of the state a failed run created. Warnings only;
/// nothing here escalates.
async fn rollback(runner: Arc<dyn CommandRunner>, root: &Path, created: &CreatedState) {
    if created.resource_group.is_none() && created.remote_repo.is_none() && !created.git_dir {
        return;
    }

    eprintln!("{}", "Rolling back created resources...".yellow().bold());

    if let Some(rg) = &created.resource_group {
        let provisioner = Provisioner::new(AzCli::new(runner.clone()));
        match provisioner.destroy(rg).await {
            Ok(()) => eprintln!("  {} requested deletion of resource group {}", "✓".green(), rg),
            Err(e) => {
                tracing::warn!(resource_group = %rg, error = %e, "rollback failed");
                eprintln!("  {} could not delete resource group {}: {}", "⚠".yellow(), rg, e);
            }
        }
    }

    if let Some(slug) = &created.remote_repo {
        let hub = GitHub::new(runner.clone());
        match hub.repo_delete(slug).await {
            Ok(()) => eprintln!("  {} deleted repository {}", "✓".green(), slug),
            Err(e) => {
                tracing::warn!(repo = %slug, error = %e, "rollback failed");
                eprintln!("  {} could not delete repository {}: {}", "⚠".yellow(), slug, e);
            }
        }
    }

    if created.git_dir {
        let git = Git::new(runner, root);
        match git.deinit() {
            Ok(()) => eprintln!("  {} removed .git", "✓".green()),
            Err(e) => {
                tracing::warn!(error = %e, "rollback failed");
                eprintln!("  {} could not remove .git: {}", "⚠".yellow(), e);
            }
        }
    }
}

fn step(title: &str) {
    println!();
    println!("{}", title.blue().bold());
}

fn enter(phase: RunPhase) {
    tracing::debug!(phase = %phase, "phase transition");
}
