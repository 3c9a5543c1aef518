use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {path}\nreason: {message}")]
    Io { path: PathBuf, message: String },

    #[error("failed to spawn `{program}`: {message}")]
    Spawn { program: String, message: String },

    #[error("template error in {name}: {message}")]
    Template { name: String, message: String },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParam { name: &'static str, reason: String },

    #[error("required tool not found: {tool}")]
    PrerequisiteMissing { tool: String },

    #[error("{tool} {found} is too old, {minimum} or newer is required")]
    RuntimeTooOld {
        tool: String,
        found: String,
        minimum: String,
    },

    #[error("scaffold incomplete, missing or empty: {}", .0.join(", "))]
    ScaffoldIncomplete(Vec<String>),
}

pub type Result<T> = std::result::Result<T, CoreError>;
