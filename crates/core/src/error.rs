//! Base error types for prehook
//!
//! Every library crate returns this error so that callers can distinguish the
//! failure conditions of a tool invocation without downcasting.

use std::path::PathBuf;
use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// Root discovery failed: the start directory is not inside a git working tree
    #[error("Not a git repository: {} ({message})", path.display())]
    NotAGitRepository {
        /// Directory discovery started from
        path: PathBuf,
        /// Detail reported by git
        message: String,
    },

    /// The configuration file failed to parse or validate
    #[error("Invalid configuration {}: {message}", path.display())]
    ConfigInvalid {
        /// Configuration file that was loaded
        path: PathBuf,
        /// Validation detail
        message: String,
    },

    /// A configured hook source has no installed environment in the store
    #[error("Hook source {repo}@{rev} is not installed")]
    InstallationMissing {
        /// Source location of the hook source
        repo: String,
        /// Revision of the hook source
        rev: String,
    },

    /// A bundled resource of the tool itself is missing
    #[error("Bundled resource '{name}' not found at {}", path.display())]
    ResourceNotFound {
        /// Resource name (e.g. `hook-tmpl`)
        name: String,
        /// Location that was probed
        path: PathBuf,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Path is not absolute
    #[error("Path must be absolute: {}", path.display())]
    PathNotAbsolute {
        /// Offending path
        path: PathBuf,
    },

    /// Store persistence error
    #[error("Store error: {0}")]
    State(String),

    /// A command run through the store's command runner failed
    #[error("Command `{command}` failed with exit code {code}: {stderr}")]
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Exit code (-1 when terminated by a signal)
        code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Whether this error points at a broken installation of the tool itself
    /// rather than something the user can fix in their repository.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::ResourceNotFound { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
