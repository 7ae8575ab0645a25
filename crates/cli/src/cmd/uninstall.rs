//! Uninstall command implementation
//!
//! Remove prehook's script from a git hook slot.

use clap::Args;
use owo_colors::OwoColorize;
use prehook_core::HookType;
use prehook_engine::ExecutionContext;
use prehook_engine::install::{self, UninstallOutcome};

use crate::command::Command;
use crate::error::{CommandError, Result};

/// Uninstall command
#[derive(Debug, Args)]
pub struct UninstallCommand {
    /// Hook to uninstall (pre-commit or pre-push)
    #[arg(short = 't', long, value_name = "TYPE", default_value = "pre-commit")]
    pub hook_type: HookType,
}

impl Command for UninstallCommand {
    type Output = UninstallOutcome;

    fn execute(&self, context: &ExecutionContext) -> Result<UninstallOutcome> {
        let path = context.hook_path_for(self.hook_type);
        let outcome = install::uninstall(context, self.hook_type)?;

        match outcome {
            UninstallOutcome::Removed => {
                println!("{} {} hook", "Removed".green(), self.hook_type);
            }
            UninstallOutcome::Restored => {
                println!(
                    "{} {} hook, previous script restored at {}",
                    "Removed".green(),
                    self.hook_type,
                    path.display()
                );
            }
            UninstallOutcome::NotInstalled => {
                println!("{} hook is not installed", self.hook_type);
            }
            UninstallOutcome::NotOurs => {
                return Err(CommandError::NotManaged {
                    hook_type: self.hook_type,
                    path: path.to_path_buf(),
                });
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use prehook_core::AbsPath;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_uninstall_refuses_foreign_script() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("repo");
        let hooks = root.join(".git").join("hooks");
        fs::create_dir_all(&hooks).unwrap();
        fs::write(hooks.join("pre-commit"), "#!/bin/sh\nmake lint\n").unwrap();
        let context = ExecutionContext::builder(AbsPath::new(root).unwrap()).build();

        let cmd = UninstallCommand {
            hook_type: HookType::PreCommit,
        };
        let err = cmd.execute(&context).unwrap_err();
        assert!(matches!(err, CommandError::NotManaged { .. }));
        assert!(hooks.join("pre-commit").exists());
    }

    #[test]
    fn test_uninstall_nothing_installed() {
        let temp = TempDir::new().unwrap();
        let context = ExecutionContext::builder(AbsPath::new(temp.path().to_path_buf()).unwrap())
            .build();

        let cmd = UninstallCommand {
            hook_type: HookType::PrePush,
        };
        assert_eq!(
            cmd.execute(&context).unwrap(),
            UninstallOutcome::NotInstalled
        );
    }
}
