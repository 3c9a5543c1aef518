//! Prerequisite checks
//!
//! Verifies the external CLIs a run depends on before anything is created.
//! These are local environment facts, assumed stable for the duration of a
//! run, so there is no retry: a missing tool aborts immediately.

use shipflow_core::{CmdSpec, CommandRunner, CoreError, Result};

/// Tools every run needs on PATH.
pub const REQUIRED_TOOLS: [&str; 4] = ["git", "python3", "az", "gh"];

/// Minimum supported Python version, inclusive.
pub const MIN_PYTHON: (u32, u32, u32) = (3, 9, 0);

/// One verified tool.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub name: &'static str,
    /// First line of `--version` output.
    pub version_line: String,
}

/// Probe every required tool and enforce the Python version floor.
pub async fn check_tools(runner: &dyn CommandRunner) -> Result<Vec<ToolStatus>> {
    let mut report = Vec::new();

    for tool in ["git", "az", "gh"] {
        report.push(probe(runner, tool).await?);
    }

    let python = probe(runner, "python3").await?;
    let found = parse_python_version(&python.version_line).ok_or_else(|| {
        CoreError::PrerequisiteMissing {
            tool: format!("python3 (unrecognized version output `{}`)", python.version_line),
        }
    })?;
    if !version_at_least(found, MIN_PYTHON) {
        return Err(CoreError::RuntimeTooOld {
            tool: "python3".to_string(),
            found: format!("{}.{}.{}", found.0, found.1, found.2),
            minimum: format!("{}.{}.{}", MIN_PYTHON.0, MIN_PYTHON.1, MIN_PYTHON.2),
        });
    }
    report.push(python);

    Ok(report)
}

async fn probe(runner: &dyn CommandRunner, tool: &'static str) -> Result<ToolStatus> {
    match runner.run(&CmdSpec::new(tool, &["--version"])).await {
        Ok(output) if output.success() => Ok(ToolStatus {
            name: tool,
            version_line: first_line(&output.stdout),
        }),
        Ok(_) | Err(CoreError::Spawn { .. }) => Err(CoreError::PrerequisiteMissing {
            tool: tool.to_string(),
        }),
        Err(e) => Err(e),
    }
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim().to_string()
}

/// Pull `X.Y.Z` out of `python3 --version` output (`Python 3.11.4`).
pub fn parse_python_version(line: &str) -> Option<(u32, u32, u32)> {
    let re = regex::Regex::new(r"(\d+)\.(\d+)\.(\d+)").ok()?;
    let caps = re.captures(line)?;
    Some((
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    ))
}

/// Inclusive minimum check: major first, then minor, then patch.
pub fn version_at_least(found: (u32, u32, u32), minimum: (u32, u32, u32)) -> bool {
    found >= minimum
}
