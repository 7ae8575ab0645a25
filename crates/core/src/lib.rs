//! Core types and utilities for prehook
//!
//! This is the foundation crate (Layer 0) that all other prehook crates depend on.
//! It provides:
//! - The error taxonomy shared by every crate
//! - Absolute path type ([`AbsPath`])
//! - Hook types and hook-source descriptors parsed from configuration
//! - The [`Memo`] cell used for lazily computed, failure-tolerant values
//! - Collaborator traits ([`ConfigLoader`], [`RootFinder`])
//!
//! This crate has no dependencies on other prehook crates.

pub mod descriptor;
pub mod error;
pub mod hook_type;
pub mod memo;
pub mod path;
pub mod traits;

pub use descriptor::{HookSelection, HookSourceDescriptor, SourceIdentity};
pub use error::{Error, Result};
pub use hook_type::HookType;
pub use memo::{Memo, MemoState};
pub use path::AbsPath;
pub use traits::{ConfigLoader, RootFinder};

/// Name of the configuration file at the root of a git repository
pub const CONFIG_FILE: &str = ".prehook.toml";
