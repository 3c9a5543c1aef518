mod commands;
mod pipeline;
mod preflight;
mod prompt;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ship")]
#[command(about = "Bootstrap a FastAPI app onto Azure App Service in one run", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full bootstrap: scaffold, repo, cloud resources, secret, push
    Up {
        /// App name (defaults to the working directory name)
        app_name: Option<String>,
        /// GitHub account that owns the repository
        #[arg(short = 'u', long = "user", env = "SHIPFLOW_USER")]
        user: Option<String>,
        /// Azure resource group (defaults to <app>-rg)
        #[arg(long)]
        resource_group: Option<String>,
        /// Azure region
        #[arg(long)]
        location: Option<String>,
        /// App Service plan name (defaults to <app>-plan)
        #[arg(long)]
        plan: Option<String>,
        /// Accept defaults and skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Write the application scaffold without touching any remote state
    Scaffold {
        /// App name (defaults to the working directory name)
        app_name: Option<String>,
    },
    /// Verify the required tools are installed
    Check,
    /// Tear down the resources of a previous run
    Destroy {
        /// App name (defaults to the working directory name)
        app_name: Option<String>,
        /// GitHub account that owns the repository
        #[arg(short = 'u', long = "user", env = "SHIPFLOW_USER")]
        user: Option<String>,
        /// Azure resource group (defaults to <app>-rg)
        #[arg(long)]
        resource_group: Option<String>,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    match cli.command {
        Commands::Up {
            app_name,
            user,
            resource_group,
            location,
            plan,
            yes,
        } => {
            commands::up::handle(app_name, user, resource_group, location, plan, yes).await?;
        }
        Commands::Scaffold { app_name } => {
            commands::scaffold::handle(app_name).await?;
        }
        Commands::Check => {
            commands::check::handle().await?;
        }
        Commands::Destroy {
            app_name,
            user,
            resource_group,
            yes,
        } => {
            commands::destroy::handle(app_name, user, resource_group, yes).await?;
        }
        Commands::Version => {
            println!("shipflow {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
