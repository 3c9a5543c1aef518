use crate::preflight;
use colored::Colorize;
use shipflow_core::ShellRunner;

pub async fn handle() -> anyhow::Result<()> {
    println!("{}", "Checking required tools...".blue().bold());

    let mut missing = Vec::new();
    for tool in preflight::REQUIRED_TOOLS {
        match which::which(tool) {
            Ok(path) => println!("  {} {} ({})", "✓".green(), tool, path.display()),
            Err(_) => {
                println!("  {} {} not found on PATH", "✗".red(), tool);
                missing.push(tool);
            }
        }
    }
    if !missing.is_empty() {
        anyhow::bail!("missing tools: {}", missing.join(", "));
    }

    let report = preflight::check_tools(&ShellRunner).await?;
    println!();
    for tool in &report {
        println!("  {} {} {}", "✓".green(), tool.name, tool.version_line.dimmed());
    }

    println!();
    println!("{}", "✓ All prerequisites satisfied".green().bold());
    Ok(())
}
