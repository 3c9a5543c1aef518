//! shipflow core
//!
//! Shared foundation for the shipflow CLI: run parameters, the command
//! execution seam, the template processor, the scaffold generator and the
//! run-phase state machine.
//!
//! # Requirements
//!
//! - External CLIs (`git`, `gh`, `az`, `python3`) are invoked through
//!   [`CommandRunner`]; nothing in this crate talks to the network itself.

pub mod error;
pub mod params;
pub mod phase;
pub mod runner;
pub mod scaffold;
pub mod template;

pub use error::{CoreError, Result};
pub use params::{PUBLISH_PROFILE_SECRET, RunParams, app_name_from_dir};
pub use phase::RunPhase;
pub use runner::{CmdOutput, CmdSpec, CommandRunner, ShellRunner};
pub use scaffold::{SCAFFOLD, ScaffoldReport, WriteMode};
pub use template::TemplateProcessor;
