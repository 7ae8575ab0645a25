//! Bundled resources shipped with prehook
//!
//! Hook script templates live in the engine crate's `resources/` directory.
//! `PREHOOK_RESOURCES_DIR` relocates them for packaged installs.

use prehook_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Template installed into `.git/hooks/pre-commit`
pub const HOOK_TEMPLATE: &str = "hook-tmpl";

/// Template installed into `.git/hooks/pre-push`
pub const PRE_PUSH_TEMPLATE: &str = "pre-push-tmpl";

/// Directory holding bundled resources
pub fn default_resources_dir() -> PathBuf {
    prehook_config::dirs::resources_dir_override()
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("resources"))
}

/// Location of the bundled resource `name` inside `resources_dir`
///
/// # Errors
///
/// Returns [`Error::ResourceNotFound`] if the resource is missing, which means
/// the tool itself is installed incorrectly.
pub fn resource_path(resources_dir: &Path, name: &str) -> Result<PathBuf> {
    let path = resources_dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::ResourceNotFound {
            name: name.to_string(),
            path,
        })
    }
}

/// Location of the bundled template `name` in the default resources directory
///
/// # Errors
///
/// Returns [`Error::ResourceNotFound`] if the template is missing.
pub fn template_path(name: &str) -> Result<PathBuf> {
    resource_path(&default_resources_dir(), name)
}
