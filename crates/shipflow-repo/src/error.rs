//! Repository error types

use thiserror::Error;

/// Errors from the git and gh wrappers.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("remote repository conflict for {repo}: {message}")]
    RemoteConflict { repo: String, message: String },

    #[error("push rejected:\n{output}")]
    PushRejected { output: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] shipflow_core::CoreError),
}

pub type Result<T> = std::result::Result<T, RepoError>;
