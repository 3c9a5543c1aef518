//! Run parameters
//!
//! Everything a single bootstrap run needs to know, collected up front from
//! flags, prompts and defaults. The generated scaffold and every cloud
//! resource name is fully determined by these values.

use crate::error::{CoreError, Result};
use std::path::Path;

/// Default port the generated app binds to.
pub const DEFAULT_PORT: u16 = 8000;

/// Gunicorn worker count baked into the startup script.
pub const DEFAULT_WORKERS: u16 = 4;

/// Gunicorn worker timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u16 = 600;

/// App Service runtime passed to `az webapp create`.
pub const DEFAULT_RUNTIME: &str = "PYTHON:3.11";

/// Python version pinned in the generated CI workflow.
pub const DEFAULT_PYTHON_VERSION: &str = "3.11";

/// App Service plan SKU (Linux).
pub const DEFAULT_SKU: &str = "B1";

/// Default Azure region.
pub const DEFAULT_LOCATION: &str = "eastus";

/// Name of the GitHub Actions secret holding the publish profile.
pub const PUBLISH_PROFILE_SECRET: &str = "AZURE_WEBAPP_PUBLISH_PROFILE";

/// Parameters for one bootstrap run.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// GitHub account that owns the remote repository.
    pub username: String,
    /// Web app name, also used as the repository name.
    pub app_name: String,
    pub resource_group: String,
    pub location: String,
    pub plan_name: String,
    pub port: u16,
    pub runtime: String,
    pub sku: String,
}

impl RunParams {
    /// Build params with defaults derived from the app name.
    pub fn new(username: impl Into<String>, app_name: impl Into<String>) -> Self {
        let app_name = app_name.into();
        Self {
            username: username.into(),
            resource_group: format!("{app_name}-rg"),
            location: DEFAULT_LOCATION.to_string(),
            plan_name: format!("{app_name}-plan"),
            port: DEFAULT_PORT,
            runtime: DEFAULT_RUNTIME.to_string(),
            sku: DEFAULT_SKU.to_string(),
            app_name,
        }
    }

    /// The `owner/name` slug of the remote repository.
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.username, self.app_name)
    }

    /// Check all fields are non-empty and names are safe to splice into
    /// CLI arguments and templates.
    pub fn validate(&self) -> Result<()> {
        ensure_name(&self.username, "username")?;
        ensure_name(&self.app_name, "app_name")?;
        ensure_name(&self.resource_group, "resource_group")?;
        ensure_name(&self.location, "location")?;
        ensure_name(&self.plan_name, "plan_name")?;
        if self.runtime.is_empty() {
            return Err(CoreError::InvalidParam {
                name: "runtime",
                reason: "must not be empty".to_string(),
            });
        }
        if self.sku.is_empty() {
            return Err(CoreError::InvalidParam {
                name: "sku",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Derive an app name from the working directory name.
///
/// Mirrors what users expect from `gh repo create`: the directory name is
/// the project name. Characters outside `[A-Za-z0-9-_]` are replaced with
/// `-` so the result is always a valid resource/repo name.
pub fn app_name_from_dir(dir: &Path) -> Option<String> {
    let name = dir.file_name()?.to_str()?;
    let sanitized: String = name
        .chars()
        .map(|c| if is_name_char(c) { c } else { '-' })
        .collect();
    let trimmed = sanitized.trim_matches('-');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

pub(crate) fn ensure_name(value: &str, name: &'static str) -> Result<()> {
    if value.is_empty() {
        return Err(CoreError::InvalidParam {
            name,
            reason: "must not be empty".to_string(),
        });
    }
    if !value.chars().all(is_name_char) {
        return Err(CoreError::InvalidParam {
            name,
            reason: format!("`{value}` contains characters outside [A-Za-z0-9-_]"),
        });
    }
    Ok(())
}
