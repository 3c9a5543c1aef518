//! Cloud provisioning error types

use thiserror::Error;

/// Errors from the `az` wrapper and the provisioner.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("az command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("resource already exists: {0}")]
    Conflict(String),

    #[error("failed to provision {resource}: {message}")]
    ProvisionFailed {
        resource: &'static str,
        message: String,
    },

    #[error("publish profile retrieval exhausted after {attempts} attempts")]
    SecretRetrievalExhausted { attempts: u32 },

    #[error("web app {app} did not become ready within {timeout_secs}s")]
    ReadinessTimeout { app: String, timeout_secs: u64 },

    #[error("unexpected az output: {0}")]
    UnexpectedOutput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] shipflow_core::CoreError),
}

pub type Result<T> = std::result::Result<T, CloudError>;
