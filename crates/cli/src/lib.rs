//! Prehook CLI library
//!
//! This library contains all the CLI logic for prehook, making it reusable
//! for testing and integration with other tools.

pub mod cmd;
pub mod command;
pub mod error;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use command::Command;
use prehook_engine::ExecutionContext;

/// Prehook - manage git hooks from versioned hook sources
#[derive(Parser)]
#[command(name = "prehook")]
#[command(about = "Manage git hooks from versioned hook sources")]
#[command(version)]
#[command(long_about = "Manage git hooks from versioned hook sources

Hook sources are listed in .prehook.toml at the repository root.
prehook installs small scripts into .git/hooks that check every configured
source before a commit or push. Existing hook scripts are kept and still run.")]
pub struct Cli {
    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "PREHOOK_LOG_FILE", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for prehook CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Install the hook script into .git/hooks
    #[command(long_about = "Install the hook script into .git/hooks

A script already present in the hook slot is moved to <hook>.legacy and
keeps running before prehook's checks. Use --overwrite to discard it.

Examples:
  • prehook install
      → Install the pre-commit hook

  • prehook install --hook-type pre-push --overwrite
      → Replace whatever pre-push script exists")]
    Install(cmd::install::InstallCommand),

    /// Remove prehook's hook script and restore the previous one
    Uninstall(cmd::uninstall::UninstallCommand),

    /// Check that every configured hook source is installed
    Verify(cmd::verify::VerifyCommand),

    /// Show the paths prehook uses for this repository
    Paths(cmd::paths::PathsCommand),
}

/// Run the CLI with the given arguments
///
/// # Errors
///
/// Returns an error if logging cannot be initialized, the current directory is
/// not inside a git repository, or the command fails.
pub fn run(cli: Cli) -> Result<()> {
    prehook_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let context = ExecutionContext::create().context("Failed to set up execution context")?;
    tracing::debug!("Running in {}", context.root());

    execute_command(&cli.command, &context)
}

fn execute_command(command: &Commands, context: &ExecutionContext) -> Result<()> {
    match command {
        Commands::Install(cmd) => {
            cmd.execute(context)?;
        }
        Commands::Uninstall(cmd) => {
            cmd.execute(context)?;
        }
        Commands::Verify(cmd) => {
            cmd.execute(context)?;
        }
        Commands::Paths(cmd) => {
            cmd.execute(context)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use clap::CommandFactory;
    use prehook_core::HookType;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_install_defaults() {
        let cli = Cli::try_parse_from(["prehook", "install"]).unwrap();
        match cli.command {
            Commands::Install(cmd) => {
                assert_eq!(cmd.hook_type, HookType::PreCommit);
                assert!(!cmd.overwrite);
            }
            _ => panic!("expected install"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_hook_type_and_global_flags() {
        let cli = Cli::try_parse_from([
            "prehook",
            "verify",
            "--hook-type",
            "pre-push",
            "-v",
            "--log-file",
            "/tmp/prehook.log",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/prehook.log")));
        match cli.command {
            Commands::Verify(cmd) => assert_eq!(cmd.hook_type, HookType::PrePush),
            _ => panic!("expected verify"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_hook_type() {
        assert!(Cli::try_parse_from(["prehook", "install", "--hook-type", "post-merge"]).is_err());
    }
}
