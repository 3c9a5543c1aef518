//! Azure provisioning for shipflow
//!
//! Everything here goes through the `az` CLI — there is no direct Azure
//! API client. The crate provides:
//!
//! - [`AzCli`]: a thin wrapper over the az commands a bootstrap run needs
//! - [`Provisioner`]: sequential resource creation, readiness polling and
//!   publish profile retrieval with bounded retry
//!
//! # Requirements
//!
//! - `az` must be installed and logged in (`az login`); the preflight check
//!   in the CLI verifies this before any resource is touched.

pub mod azcli;
pub mod error;
pub mod provision;

pub use azcli::{AccountInfo, AzCli, PublishProfile, WebAppInfo, parse_publish_profile};
pub use error::{CloudError, Result};
pub use provision::{ProvisionedApp, Provisioner, RetryConfig};
