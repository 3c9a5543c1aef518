//! git and GitHub plumbing for shipflow
//!
//! Two thin CLI wrappers: [`Git`] for the local repository (idempotent
//! init, branch normalization, commit/push) and [`GitHub`] for the hosting
//! side (repo create/delete, Actions secrets) via `gh`.

pub mod error;
pub mod git;
pub mod hub;

pub use error::{RepoError, Result};
pub use git::{DEFAULT_BRANCH, Git};
pub use hub::GitHub;
