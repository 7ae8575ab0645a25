//! Verify command implementation
//!
//! Resolve every configured hook source against the store. This is what the
//! installed hook scripts run: a missing installation fails the hook.

use clap::Args;
use owo_colors::OwoColorize;
use prehook_core::HookType;
use prehook_engine::ExecutionContext;
use prehook_engine::install;
use tracing::{debug, warn};

use crate::command::Command;
use crate::error::Result;

/// Verify command
#[derive(Debug, Args)]
pub struct VerifyCommand {
    /// Hook being verified (pre-commit or pre-push)
    #[arg(short = 't', long, value_name = "TYPE", default_value = "pre-commit")]
    pub hook_type: HookType,

    /// Only print failures
    #[arg(short, long)]
    pub quiet: bool,
}

impl Command for VerifyCommand {
    /// Number of resolved hook sources
    type Output = usize;

    fn execute(&self, context: &ExecutionContext) -> Result<usize> {
        let hook_path = context.hook_path_for(self.hook_type);
        if !install::is_our_script(hook_path) {
            warn!(
                "{} hook is not installed; run `prehook install --hook-type {}`",
                self.hook_type, self.hook_type
            );
        }

        let repositories = context.repositories()?;
        debug!(
            "Verified {} hook source(s) for {}",
            repositories.len(),
            self.hook_type
        );

        if !self.quiet {
            for repo in repositories {
                let hooks: Vec<_> = repo.descriptor().hook_ids().collect();
                println!(
                    "{} {} ({})",
                    "✓".green(),
                    repo.descriptor().identity().bold(),
                    hooks.join(", ")
                );
                println!("    {}", repo.environment_dir().display().dimmed());
            }
            if repositories.is_empty() {
                println!("No hook sources configured in {}", context.config_file_path().display());
            }
        }

        Ok(repositories.len())
    }
}
