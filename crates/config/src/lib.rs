//! Configuration management for prehook
//!
//! This crate handles:
//! - Loading and validating `.prehook.toml`
//! - Git root discovery
//! - Store and resource directory resolution
//! - Logging initialization

pub mod dirs;
pub mod git;
pub mod loader;
pub mod logging;

// Re-export error types from core
pub use prehook_core::{Error, Result};

// Re-export main types
pub use dirs::store_dir;
pub use git::{Git2RootFinder, find_root};
pub use loader::{TomlConfigLoader, load_config, parse_config};
