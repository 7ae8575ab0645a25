//! # Prehook Engine
//!
//! Execution machinery for the prehook git-hook manager.
//!
//! - **Paths**: canonical locations of hook scripts, legacy backups and the config file
//! - **Resources**: bundled hook-script templates
//! - **Store**: persistent record of installed hook-source environments
//! - **Repository**: verification of configured sources against the store
//! - **Runner**: the per-invocation [`ExecutionContext`] with memoized accessors
//! - **Install**: writing and removing prehook's scripts in `.git/hooks`

pub mod command;
pub mod install;
pub mod paths;
pub mod repository;
pub mod resources;
pub mod runner;
pub mod store;

// Re-export error and path types from core
pub use prehook_core::{AbsPath, Error, HookType, Result};

pub use command::{CommandOutput, PrefixedCommandRunner};
pub use install::{InstallOutcome, UninstallOutcome};
pub use repository::{Repository, ResolvedRepository};
pub use runner::{ExecutionContext, ExecutionContextBuilder};
pub use store::{InstalledEnvironment, Store};
