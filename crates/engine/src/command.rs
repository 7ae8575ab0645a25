//! Command execution scoped to a prefix directory
//!
//! Installed environments run their tooling relative to the store. Arguments
//! may contain the `{prefix}` placeholder, which is replaced with the prefix
//! directory followed by a path separator.

use prehook_core::{Error, Result};
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Placeholder substituted with the prefix directory
pub const PREFIX_PLACEHOLDER: &str = "{prefix}";

/// Captured result of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (-1 when terminated by a signal)
    pub code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the command exited with status 0
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs commands with `{prefix}` expanded to a fixed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixedCommandRunner {
    prefix_dir: PathBuf,
}

impl PrefixedCommandRunner {
    /// Create a runner for `prefix_dir`
    pub fn new(prefix_dir: impl Into<PathBuf>) -> Self {
        Self {
            prefix_dir: prefix_dir.into(),
        }
    }

    /// The prefix directory
    pub fn prefix_dir(&self) -> &Path {
        &self.prefix_dir
    }

    /// Join path components onto the prefix directory
    pub fn path<I, P>(&self, parts: I) -> PathBuf
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        parts
            .into_iter()
            .fold(self.prefix_dir.clone(), |acc, part| acc.join(part))
    }

    /// Expand `{prefix}` in every argument
    pub fn render_args<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let prefix = format!("{}{MAIN_SEPARATOR}", self.prefix_dir.display());
        args.iter()
            .map(|arg| arg.as_ref().replace(PREFIX_PLACEHOLDER, &prefix))
            .collect()
    }

    /// Run a command, capturing its output
    ///
    /// A non-zero exit status is reported in [`CommandOutput::code`], not as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if `args` is empty or the program cannot be started.
    #[tracing::instrument(skip(self, args), fields(prefix = %self.prefix_dir.display()))]
    pub fn run<S: AsRef<str>>(&self, args: &[S], cwd: Option<&Path>) -> Result<CommandOutput> {
        let rendered = self.render_args(args);
        let Some((program, rest)) = rendered.split_first() else {
            return Err(Error::Message("Empty command".to_string()));
        };

        tracing::debug!("Executing command: {} {:?}", program, rest);

        let mut cmd_builder = duct::cmd(program, rest)
            .stdout_capture()
            .stderr_capture()
            .unchecked();
        if let Some(dir) = cwd {
            cmd_builder = cmd_builder.dir(dir);
        }

        let output = cmd_builder.run().map_err(|e| {
            Error::Message(format!("Failed to start command '{program}': {e}"))
        })?;

        Ok(CommandOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run a command and fail on a non-zero exit status
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandFailed`] when the command exits unsuccessfully.
    pub fn run_checked<S: AsRef<str>>(
        &self,
        args: &[S],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput> {
        let output = self.run(args, cwd)?;
        if output.success() {
            Ok(output)
        } else {
            Err(Error::CommandFailed {
                command: self.render_args(args).join(" "),
                code: output.code,
                stderr: output.stderr,
            })
        }
    }
}
