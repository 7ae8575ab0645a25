//! Install command implementation
//!
//! Write prehook's script into a git hook slot.

use clap::Args;
use owo_colors::OwoColorize;
use prehook_core::HookType;
use prehook_engine::ExecutionContext;
use prehook_engine::install::{self, InstallOutcome};

use crate::command::Command;
use crate::error::Result;

/// Install command
#[derive(Debug, Args)]
pub struct InstallCommand {
    /// Hook to install (pre-commit or pre-push)
    #[arg(short = 't', long, value_name = "TYPE", default_value = "pre-commit")]
    pub hook_type: HookType,

    /// Replace an existing hook script instead of keeping it as <hook>.legacy
    #[arg(short, long)]
    pub overwrite: bool,
}

impl Command for InstallCommand {
    type Output = InstallOutcome;

    fn execute(&self, context: &ExecutionContext) -> Result<InstallOutcome> {
        let outcome = install::install(context, self.hook_type, self.overwrite)?;
        let path = context.hook_path_for(self.hook_type);

        match outcome {
            InstallOutcome::Installed => {
                println!("{} {} hook at {}", "Installed".green(), self.hook_type, path.display());
            }
            InstallOutcome::AlreadyInstalled => {
                println!("{} hook already installed at {}", self.hook_type, path.display());
            }
            InstallOutcome::Migrated => {
                println!("{} {} hook at {}", "Installed".green(), self.hook_type, path.display());
                println!(
                    "  previous script kept at {} and still runs first",
                    context.legacy_path_for(self.hook_type).display().dimmed()
                );
            }
            InstallOutcome::Replaced => {
                println!(
                    "{} {} hook at {} (previous script removed)",
                    "Installed".green(),
                    self.hook_type,
                    path.display()
                );
            }
        }

        Ok(outcome)
    }
}
