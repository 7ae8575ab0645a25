//! Error types for CLI commands
//!
//! Commands return [`CommandError`]; `main` turns whatever reaches it into an
//! exit code with [`exit_code`].

use prehook_core::HookType;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for failures the user can fix (bad config, missing install, ...)
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for a broken prehook installation (missing bundled resources)
pub const EXIT_BROKEN_INSTALL: i32 = 3;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// Error reported by the engine
    #[error(transparent)]
    Engine(#[from] prehook_core::Error),

    /// The hook slot is occupied by a script prehook did not write
    #[error("{hook_type} hook at {} is not managed by prehook", path.display())]
    NotManaged {
        /// Hook type
        hook_type: HookType,
        /// Live hook path
        path: PathBuf,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;

impl CommandError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Engine(e) if e.is_internal() => EXIT_BROKEN_INSTALL,
            Self::Other(e) => exit_code(e),
            _ => EXIT_FAILURE,
        }
    }
}

/// Exit code for an error that reached `main`
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<CommandError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<prehook_core::Error>() {
            return if e.is_internal() {
                EXIT_BROKEN_INSTALL
            } else {
                EXIT_FAILURE
            };
        }
    }
    EXIT_FAILURE
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use prehook_core::Error as CoreError;

    fn resource_missing() -> CoreError {
        CoreError::ResourceNotFound {
            name: "hook-tmpl".to_string(),
            path: PathBuf::from("/opt/prehook/resources/hook-tmpl"),
        }
    }

    #[test]
    fn test_engine_error_is_transparent() {
        let error: CommandError = CoreError::InstallationMissing {
            repo: "https://example.com/hooks".to_string(),
            rev: "v1".to_string(),
        }
        .into();

        assert_eq!(
            error.to_string(),
            "Hook source https://example.com/hooks@v1 is not installed"
        );
        assert_eq!(error.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_broken_install_exit_code() {
        let error: CommandError = resource_missing().into();
        assert_eq!(error.exit_code(), EXIT_BROKEN_INSTALL);
    }

    #[test]
    fn test_not_managed_error() {
        let error = CommandError::NotManaged {
            hook_type: HookType::PrePush,
            path: PathBuf::from("/repo/.git/hooks/pre-push"),
        };

        let error_msg = error.to_string();
        assert!(error_msg.contains("pre-push"));
        assert!(error_msg.contains("not managed by prehook"));
        assert_eq!(error.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_exit_code_through_anyhow_context() {
        let err = anyhow::Error::from(CommandError::from(resource_missing()))
            .context("Failed to install hook");
        assert_eq!(exit_code(&err), EXIT_BROKEN_INSTALL);

        let err = anyhow::Error::from(resource_missing()).context("Failed to read template");
        assert_eq!(exit_code(&err), EXIT_BROKEN_INSTALL);

        let err = anyhow::anyhow!("something went wrong");
        assert_eq!(exit_code(&err), EXIT_FAILURE);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CommandError = io_error.into();
        assert!(error.to_string().contains("IO error"));
    }
}
