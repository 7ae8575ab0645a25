//! Directory resolution
//!
//! The hook-source store lives in an XDG-compliant cache directory using the
//! `xdg` crate:
//! - `PREHOOK_HOME` overrides everything
//! - otherwise `$XDG_CACHE_HOME/prehook` (defaults to `~/.cache/prehook`)

use std::ffi::OsString;
use std::path::PathBuf;
use xdg::BaseDirectories;

/// Environment variable overriding the store directory
pub const STORE_DIR_ENV: &str = "PREHOOK_HOME";

/// Environment variable overriding the bundled resources directory
pub const RESOURCES_DIR_ENV: &str = "PREHOOK_RESOURCES_DIR";

/// Get the store directory
///
/// Returns `$PREHOOK_HOME`, or `$XDG_CACHE_HOME/prehook` / `~/.cache/prehook`.
#[must_use]
pub fn store_dir() -> Option<PathBuf> {
    store_dir_from(std::env::var_os(STORE_DIR_ENV))
}

fn store_dir_from(override_dir: Option<OsString>) -> Option<PathBuf> {
    match override_dir {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        // xdg 3.0: with_prefix returns BaseDirectories, get_*_home returns Option<PathBuf>
        _ => BaseDirectories::with_prefix("prehook").get_cache_home(),
    }
}

/// Get the resources directory override, if set
#[must_use]
pub fn resources_dir_override() -> Option<PathBuf> {
    std::env::var_os(RESOURCES_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
}
