//! Loading and validation of `.prehook.toml`
//!
//! The config file is an ordered list of hook sources:
//!
//! ```toml
//! [[repos]]
//! repo = "https://github.com/example/hooks"
//! rev = "v1.2.0"
//! hooks = [
//!     { id = "trailing-whitespace" },
//!     { id = "lint", args = ["--fix"], files = "\\.rs$" },
//! ]
//! ```
//!
//! Order is significant: hooks execute in configuration order.

use prehook_core::{ConfigLoader, Error, HookSourceDescriptor, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    repos: Vec<HookSourceDescriptor>,
}

/// Load and validate the config file at `path`
///
/// # Errors
///
/// Returns [`Error::ConfigInvalid`] if the file cannot be read, is not valid
/// TOML, or violates the schema.
pub fn load_config(path: &Path) -> Result<Vec<HookSourceDescriptor>> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigInvalid {
        path: path.to_path_buf(),
        message: format!("failed to read config file: {e}"),
    })?;

    parse_config(&content, path)
}

/// Parse and validate config text; `path` is only used in error messages
///
/// # Errors
///
/// Returns [`Error::ConfigInvalid`] on TOML or schema errors.
pub fn parse_config(content: &str, path: &Path) -> Result<Vec<HookSourceDescriptor>> {
    let invalid = |message: String| Error::ConfigInvalid {
        path: path.to_path_buf(),
        message,
    };

    let config: ConfigFile = toml::from_str(content).map_err(|e| invalid(e.to_string()))?;
    validate(&config.repos).map_err(invalid)?;

    tracing::debug!(
        "Loaded {} hook source(s) from {}",
        config.repos.len(),
        path.display()
    );
    Ok(config.repos)
}

fn validate(repos: &[HookSourceDescriptor]) -> std::result::Result<(), String> {
    for (index, source) in repos.iter().enumerate() {
        let position = index + 1;

        if source.repo.trim().is_empty() {
            return Err(format!("repos[{position}]: 'repo' must not be empty"));
        }
        if source.rev.trim().is_empty() {
            return Err(format!(
                "repos[{position}] ({}): 'rev' must not be empty",
                source.repo
            ));
        }
        if source.hooks.is_empty() {
            return Err(format!(
                "repos[{position}] ({}): at least one hook must be listed",
                source.repo
            ));
        }

        let mut seen = HashSet::new();
        for hook in &source.hooks {
            if hook.id.trim().is_empty() {
                return Err(format!(
                    "repos[{position}] ({}): hook 'id' must not be empty",
                    source.repo
                ));
            }
            if !seen.insert(hook.id.as_str()) {
                return Err(format!(
                    "repos[{position}] ({}): hook '{}' is listed more than once",
                    source.repo, hook.id
                ));
            }
            for (field, pattern) in [("files", &hook.files), ("exclude", &hook.exclude)] {
                if let Some(pattern) = pattern
                    && let Err(e) = Regex::new(pattern)
                {
                    return Err(format!(
                        "repos[{position}] ({}): hook '{}' has an invalid '{field}' regex: {e}",
                        source.repo, hook.id
                    ));
                }
            }
        }
    }

    Ok(())
}

/// [`ConfigLoader`] backed by the TOML file format
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlConfigLoader;

impl ConfigLoader for TomlConfigLoader {
    fn load_config(&self, path: &Path) -> Result<Vec<HookSourceDescriptor>> {
        load_config(path)
    }
}
