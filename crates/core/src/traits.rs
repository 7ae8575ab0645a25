//! Collaborator traits
//!
//! The execution context depends on these interfaces rather than on the
//! concrete TOML loader and libgit2 discovery, so tests can substitute
//! counting or failing implementations.

use crate::Result;
use crate::descriptor::HookSourceDescriptor;
use std::path::{Path, PathBuf};

/// Loads the hook configuration
///
/// # Examples
///
/// ```ignore
/// fn count_sources(loader: &dyn ConfigLoader, path: &Path) -> Result<usize> {
///     Ok(loader.load_config(path)?.len())
/// }
/// ```
pub trait ConfigLoader {
    /// Parse and validate the config file at `path` into an ordered sequence of
    /// hook-source descriptors
    ///
    /// Fails with [`Error::ConfigInvalid`](crate::Error::ConfigInvalid) on
    /// schema violations.
    fn load_config(&self, path: &Path) -> Result<Vec<HookSourceDescriptor>>;
}

/// Discovers the top-level directory of the enclosing git repository
pub trait RootFinder {
    /// Return the absolute working-tree root containing `start`
    ///
    /// Fails with [`Error::NotAGitRepository`](crate::Error::NotAGitRepository)
    /// when `start` is not inside a git working tree.
    fn find_root(&self, start: &Path) -> Result<PathBuf>;
}
