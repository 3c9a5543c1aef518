//! Scaffold generation
//!
//! Writes the fixed set of files that make up a deployable FastAPI app:
//! application entrypoint, dependency manifest, startup script, IIS
//! descriptor, ignore file and CI workflow. Template sources live as
//! `.tera` files under `templates/` and are embedded into the binary.
//!
//! Generation is idempotent: package markers are only created when absent,
//! configuration files are overwritten, and rendered content depends on
//! nothing but [`RunParams`].

use crate::error::{CoreError, Result};
use crate::params::{
    DEFAULT_PYTHON_VERSION, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS, RunParams,
};
use crate::template::TemplateProcessor;
use std::path::{Path, PathBuf};

/// Embedded scaffold templates.
#[derive(rust_embed::RustEmbed)]
#[folder = "templates/"]
struct ScaffoldTemplates;

/// How a scaffold file is written on repeat runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Package markers: written once, never touched again.
    CreateIfAbsent,
    /// Configuration and startup templates: always rewritten.
    Overwrite,
}

/// One entry in the fixed scaffold set.
#[derive(Debug, Clone, Copy)]
pub struct ScaffoldFile {
    /// Path relative to the project root.
    pub rel_path: &'static str,
    /// Embedded template name; `None` writes an empty marker file.
    pub template: Option<&'static str>,
    pub mode: WriteMode,
}

/// The full scaffold, in write order.
pub const SCAFFOLD: &[ScaffoldFile] = &[
    ScaffoldFile {
        rel_path: "app/__init__.py",
        template: None,
        mode: WriteMode::CreateIfAbsent,
    },
    ScaffoldFile {
        rel_path: "app/main.py",
        template: Some("app_main.py.tera"),
        mode: WriteMode::Overwrite,
    },
    ScaffoldFile {
        rel_path: "wsgi.py",
        template: Some("wsgi.py.tera"),
        mode: WriteMode::Overwrite,
    },
    ScaffoldFile {
        rel_path: "requirements.txt",
        template: Some("requirements.txt.tera"),
        mode: WriteMode::Overwrite,
    },
    ScaffoldFile {
        rel_path: "startup.sh",
        template: Some("startup.sh.tera"),
        mode: WriteMode::Overwrite,
    },
    ScaffoldFile {
        rel_path: "web.config",
        template: Some("web.config.tera"),
        mode: WriteMode::Overwrite,
    },
    ScaffoldFile {
        rel_path: ".gitignore",
        template: Some("gitignore.tera"),
        mode: WriteMode::Overwrite,
    },
    ScaffoldFile {
        rel_path: ".github/workflows/deploy.yml",
        template: Some("deploy.yml.tera"),
        mode: WriteMode::Overwrite,
    },
];

/// What a generation pass actually did.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldReport {
    pub written: Vec<PathBuf>,
    /// Markers that already existed and were left alone.
    pub skipped: Vec<PathBuf>,
}

/// Render and write the scaffold into `root`.
///
/// Only the parameters that shape file content are required here; the full
/// parameter set is validated before the pipeline touches remote state.
pub fn generate(root: &Path, params: &RunParams) -> Result<ScaffoldReport> {
    crate::params::ensure_name(&params.app_name, "app_name")?;
    let mut processor = build_processor(params);
    let mut report = ScaffoldReport::default();

    for file in SCAFFOLD {
        let target = root.join(file.rel_path);

        if file.mode == WriteMode::CreateIfAbsent && target.exists() {
            tracing::debug!(path = %target.display(), "marker exists, skipping");
            report.skipped.push(target);
            continue;
        }

        let content = match file.template {
            Some(name) => processor.render(name, &load_template(name)?)?,
            None => String::new(),
        };

        write_file(&target, &content)?;
        report.written.push(target);
    }

    Ok(report)
}

/// Confirm every scaffold path exists, and that templated files are
/// non-empty. Remote state must not be touched until this passes.
pub fn verify(root: &Path) -> Result<()> {
    let mut missing = Vec::new();

    for file in SCAFFOLD {
        let target = root.join(file.rel_path);
        match std::fs::metadata(&target) {
            Err(_) => missing.push(file.rel_path.to_string()),
            Ok(meta) if file.template.is_some() && meta.len() == 0 => {
                missing.push(file.rel_path.to_string());
            }
            Ok(_) => {}
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::ScaffoldIncomplete(missing))
    }
}

fn build_processor(params: &RunParams) -> TemplateProcessor {
    let mut processor = TemplateProcessor::new();
    processor.add_variable("app_name", params.app_name.as_str());
    processor.add_variable("port", params.port);
    processor.add_variable("workers", DEFAULT_WORKERS);
    processor.add_variable("timeout", DEFAULT_TIMEOUT_SECS);
    processor.add_variable("python_version", DEFAULT_PYTHON_VERSION);
    processor
}

fn load_template(name: &str) -> Result<String> {
    let file = ScaffoldTemplates::get(name).ok_or_else(|| CoreError::Template {
        name: name.to_string(),
        message: "embedded template not found".to_string(),
    })?;
    String::from_utf8(file.data.into_owned()).map_err(|e| CoreError::Template {
        name: name.to_string(),
        message: format!("invalid UTF-8: {e}"),
    })
}

fn write_file(target: &Path, content: &str) -> Result<()> {
    let io_err = |e: std::io::Error| CoreError::Io {
        path: target.to_path_buf(),
        message: e.to_string(),
    };

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(target, content).map_err(io_err)?;
    Ok(())
}
