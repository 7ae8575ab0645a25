//! Git hook types managed by prehook

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A git hook slot that prehook can install into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookType {
    /// `.git/hooks/pre-commit`
    PreCommit,
    /// `.git/hooks/pre-push`
    PrePush,
}

impl HookType {
    /// All supported hook types, in installation order
    pub const ALL: [HookType; 2] = [HookType::PreCommit, HookType::PrePush];

    /// File name git invokes for this hook
    pub fn name(self) -> &'static str {
        match self {
            HookType::PreCommit => "pre-commit",
            HookType::PrePush => "pre-push",
        }
    }

    /// Name of the bundled script template installed into this slot
    pub fn template_name(self) -> &'static str {
        match self {
            HookType::PreCommit => "hook-tmpl",
            HookType::PrePush => "pre-push-tmpl",
        }
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HookType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre-commit" => Ok(HookType::PreCommit),
            "pre-push" => Ok(HookType::PrePush),
            other => Err(Error::Message(format!(
                "Unsupported hook type '{other}' (expected pre-commit or pre-push)"
            ))),
        }
    }
}
