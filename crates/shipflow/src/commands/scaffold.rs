use colored::Colorize;
use shipflow_core::{RunParams, app_name_from_dir, scaffold};

pub async fn handle(app_name: Option<String>) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    let app_name = app_name
        .or_else(|| app_name_from_dir(&root))
        .ok_or_else(|| anyhow::anyhow!("could not derive an app name, pass one explicitly"))?;

    // Scaffolding alone never touches remote state, so no username needed.
    let params = RunParams::new(String::new(), app_name);

    println!(
        "{}",
        format!("Writing scaffold for '{}'...", params.app_name)
            .blue()
            .bold()
    );

    let report = scaffold::generate(&root, &params)?;
    scaffold::verify(&root)?;

    for path in &report.written {
        println!("  {} {}", "✓".green(), path.display());
    }
    for path in &report.skipped {
        println!("  {} {} (kept)", "•".dimmed(), path.display());
    }

    println!();
    println!(
        "{}",
        format!("✓ Scaffold complete ({} files)", report.written.len())
            .green()
            .bold()
    );
    Ok(())
}
