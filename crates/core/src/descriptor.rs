//! Hook-source descriptors
//!
//! A descriptor is what the config file says about one hook source: where it
//! lives, which revision to use, and which of its hooks to activate. Descriptors
//! are produced by the config loader and are read-only to everything else.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One configured hook source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSourceDescriptor {
    /// Source location (URL or path)
    pub repo: String,

    /// Revision to use (tag, branch or commit)
    pub rev: String,

    /// Hooks to activate from this source, in execution order
    pub hooks: Vec<HookSelection>,
}

/// A hook activated from a hook source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSelection {
    /// Hook identifier within the source
    pub id: String,

    /// Extra arguments passed to the hook
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Regex of files the hook applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<String>,

    /// Regex of files excluded from the hook
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

/// Identity of a hook source: the key under which the store records its
/// installed environment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceIdentity {
    /// Source location
    pub repo: String,
    /// Revision
    pub rev: String,
}

impl HookSourceDescriptor {
    /// Identity of this source
    pub fn identity(&self) -> SourceIdentity {
        SourceIdentity {
            repo: self.repo.clone(),
            rev: self.rev.clone(),
        }
    }

    /// Identifiers of the activated hooks, in order
    pub fn hook_ids(&self) -> impl Iterator<Item = &str> {
        self.hooks.iter().map(|h| h.id.as_str())
    }
}

impl fmt::Display for SourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.repo, self.rev)
    }
}
