//! CLI command implementations
//!
//! This module contains all command implementations for the prehook CLI.

pub mod install;
pub mod paths;
pub mod uninstall;
pub mod verify;
