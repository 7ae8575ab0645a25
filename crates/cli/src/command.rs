//! Command trait for prehook CLI
//!
//! Every subcommand that works on a repository implements [`Command`]. The
//! `execute` method receives the [`ExecutionContext`] created once for the
//! invocation, so all commands see the same root, paths and store handle.

use crate::error::Result;
use prehook_engine::ExecutionContext;

/// Trait for all prehook commands
///
/// # Example
///
/// ```rust,ignore
/// use crate::command::Command;
/// use crate::error::Result;
/// use clap::Args;
/// use prehook_engine::ExecutionContext;
///
/// #[derive(Debug, Args)]
/// pub struct ShowRoot;
///
/// impl Command for ShowRoot {
///     type Output = ();
///
///     fn execute(&self, context: &ExecutionContext) -> Result<()> {
///         println!("{}", context.root());
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command against the invocation's execution context
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` if the command fails. Messages should tell the
    /// user what to fix.
    fn execute(&self, context: &ExecutionContext) -> Result<Self::Output>;
}
