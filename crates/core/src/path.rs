//! Absolute path newtype
//!
//! The execution context is bound to a git root that must be absolute; this
//! type makes that guarantee part of the signature instead of a runtime hope.
//!
//! # Examples
//!
//! ```
//! use prehook_core::path::AbsPath;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = AbsPath::new("/home/user/project".into())?;
//! let hooks = root.join(".git/hooks");
//! assert_eq!(hooks.as_path().to_str().unwrap(), "/home/user/project/.git/hooks");
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An absolute path on the filesystem
///
/// This type guarantees that the path is absolute (starts with `/` on Unix or a
/// drive letter on Windows).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbsPath(PathBuf);

impl AbsPath {
    /// Create a new `AbsPath` from a `PathBuf`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute.
    ///
    /// # Examples
    ///
    /// ```
    /// use prehook_core::path::AbsPath;
    ///
    /// assert!(AbsPath::new("/srv/repo".into()).is_ok());
    /// assert!(AbsPath::new("relative/repo".into()).is_err());
    /// ```
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.is_absolute() {
            Ok(AbsPath(path))
        } else {
            Err(Error::PathNotAbsolute { path })
        }
    }

    /// Create a new `AbsPath` from a reference to a `Path`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::new(path.to_path_buf())
    }

    /// Get the underlying `Path`
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Convert to a `PathBuf`
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Join with a relative component; the result stays absolute
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.0.join(rel)
    }

    /// Get the parent directory
    ///
    /// Returns `None` if this is the root directory.
    pub fn parent(&self) -> Option<Self> {
        self.0.parent().map(|p| AbsPath(p.to_path_buf()))
    }

    /// Get the file name
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|s| s.to_str())
    }
}

impl AsRef<Path> for AbsPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for AbsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
