//! Git root discovery
//!
//! Uses libgit2 (via `git2`) to find the working tree that contains a
//! directory, the same way `git rev-parse --show-toplevel` would.

use prehook_core::{Error, Result, RootFinder};
use std::path::{Path, PathBuf};

/// Find the working tree root of the repository containing `start`
///
/// Searches upward from `start` for a `.git` directory or file. The returned
/// path has no trailing separator.
///
/// # Errors
///
/// Returns [`Error::NotAGitRepository`] if no repository is found or the
/// repository is bare (has no working tree).
pub fn find_root(start: &Path) -> Result<PathBuf> {
    let not_a_repo = |message: String| Error::NotAGitRepository {
        path: start.to_path_buf(),
        message,
    };

    let repo = git2::Repository::discover(start).map_err(|e| not_a_repo(e.message().to_string()))?;
    let workdir = repo
        .workdir()
        .ok_or_else(|| not_a_repo("repository has no working tree".to_string()))?;

    // libgit2 reports the workdir with a trailing slash
    let root: PathBuf = workdir.components().collect();
    tracing::debug!("Discovered git root {}", root.display());
    Ok(root)
}

/// [`RootFinder`] backed by libgit2 discovery
#[derive(Debug, Clone, Copy, Default)]
pub struct Git2RootFinder;

impl RootFinder for Git2RootFinder {
    fn find_root(&self, start: &Path) -> Result<PathBuf> {
        find_root(start)
    }
}
